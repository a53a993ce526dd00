use chipvm::{memory::Memory, Emulator, VmError};
use proptest::prelude::*;

fn assemble(program: &[u16]) -> Vec<u8> {
    program.iter().flat_map(|w| w.to_be_bytes()).collect()
}

fn boot(program: &[u16]) -> Emulator {
    let mut emu = Emulator::with_seed(1);
    emu.load(&assemble(program)).expect("program fits");
    emu
}

fn assert_reset(emu: &Emulator) {
    let regs = emu.registers();
    assert_eq!(regs.all(), &[0; 16]);
    assert_eq!(regs.pc.get(), 0x200);
    assert_eq!(regs.index.get(), 0);
    assert_eq!(regs.stack.depth(), 0);
    assert_eq!(regs.delay.get(), 0);
    assert_eq!(regs.sound.get(), 0);
    assert!(emu.display().cells().iter().all(|&c| !c));
    assert_eq!(emu.keyboard().first_down(), None);
}

proptest! {
    #[test]
    fn load_places_program_and_resets(rom in proptest::collection::vec(any::<u8>(), 0..=Memory::program_capacity())) {
        let mut emu = Emulator::with_seed(0);
        emu.load(&rom).unwrap();
        prop_assert_eq!(&emu.memory().as_bytes()[0x200..0x200 + rom.len()], rom.as_slice());
        prop_assert!(emu.memory().as_bytes()[0x200 + rom.len()..].iter().all(|&b| b == 0));
        assert_reset(&emu);
    }
}

#[test]
fn oversized_program_is_rejected_and_machine_untouched() {
    let mut emu = boot(&[0x6A05, 0x1202]);
    emu.step().unwrap();
    let err = emu.load(&vec![0; 4096 - 0x200 + 1]).unwrap_err();
    assert_eq!(
        err,
        VmError::CapacityExceeded {
            len: 3585,
            capacity: 3584
        }
    );
    assert_eq!(emu.registers().get(0xA), 0x05);
    assert_eq!(emu.pc(), 0x202);
    assert_eq!(emu.memory().read16(0x200).unwrap(), 0x6A05);
}

#[test]
fn reload_wipes_everything() {
    // draw a glyph, call a subroutine, set timers, hold a key
    let mut emu = boot(&[0xA050, 0xD005, 0x6010, 0xF015, 0xF018, 0x220C, 0x120C]);
    emu.keyboard_mut().set_down(0x3, true);
    for _ in 0..6 {
        emu.step().unwrap();
    }
    assert!(emu.registers().stack.depth() > 0);
    emu.load(&assemble(&[0x00E0])).unwrap();
    assert_reset(&emu);
    assert_eq!(emu.memory().read16(0x202).unwrap(), 0x0000);
}

#[test]
fn countdown_loop_runs_to_completion() {
    // V0 = 10; loop: V0 -= 1 (via V1 = 1, 8015); skip when zero; jump loop; halt
    let mut emu = boot(&[
        0x600A, // 200: V0 = 10
        0x6101, // 202: V1 = 1
        0x8015, // 204: V0 -= V1
        0x3000, // 206: skip if V0 == 0
        0x1204, // 208: loop
        0x120A, // 20A: halt
    ]);
    for _ in 0..100 {
        emu.step().unwrap();
    }
    assert_eq!(emu.pc(), 0x20A);
    assert_eq!(emu.registers().get(0x0), 0);
    // last subtraction 1 - 1 has no borrow
    assert_eq!(emu.registers().flag(), 1);
}

#[test]
fn digits_of_a_register_are_stored_and_drawn() {
    // BCD of V0 into 0x300, load back into V0..V2, draw hundreds digit glyph
    let mut emu = boot(&[
        0x607B, // V0 = 123
        0xA300, // I = 0x300
        0xF033, // BCD
        0xF265, // V0..V2 = 1, 2, 3
        0xA055, // I = font glyph "1"
        0x6A00, // VA = 0
        0xDAA5, // draw at (0, 0)
    ]);
    for _ in 0..7 {
        emu.step().unwrap();
    }
    assert_eq!(emu.registers().get(0x1), 2);
    assert_eq!(emu.registers().get(0x2), 3);
    // glyph "1" is 0x20 0x60 0x20 0x20 0x70
    let fb = emu.display();
    assert!(fb.pixel(2, 0));
    assert!(fb.pixel(1, 1) && fb.pixel(2, 1));
    assert!(fb.pixel(1, 4) && fb.pixel(2, 4) && fb.pixel(3, 4));
    assert!(!fb.pixel(0, 0));
    assert_eq!(emu.registers().flag(), 0);
}

#[test]
fn key_wait_blocks_until_pressed() {
    let mut emu = boot(&[0xF50A, 0x1202]);
    for _ in 0..20 {
        emu.step().unwrap();
        assert_eq!(emu.pc(), 0x200);
    }
    emu.keyboard_mut().set_down(0xE, true);
    emu.keyboard_mut().set_down(0x2, true);
    emu.step().unwrap();
    assert_eq!(emu.pc(), 0x202);
    assert_eq!(emu.registers().get(0x5), 0x2);
}

#[test]
fn running_off_the_end_hits_an_unrecognized_instruction() {
    let mut emu = boot(&[0x6001]);
    emu.step().unwrap();
    assert_eq!(
        emu.step(),
        Err(VmError::UnrecognizedInstruction {
            opcode: 0x0000,
            addr: 0x202
        })
    );
}

#[test]
fn errors_describe_the_fault() {
    let err = VmError::UnrecognizedInstruction {
        opcode: 0x0FFF,
        addr: 0x202,
    };
    assert_eq!(err.to_string(), "unrecognized instruction 0x0fff at 0x202");
    assert_eq!(
        VmError::StackOverflow { addr: 0x200 }.to_string(),
        "call stack overflow at 0x200"
    );
}
