use crate::gameboy::RunOptions;
use crate::lr35902::cpu::Cpu;
use crate::lr35902::registers::Flags;
use crate::lr35902::sm83::Register;
use crate::memory::cartridge::tests::rom_with_header;
use crate::memory::cartridge::Cartridge;
use crate::memory::mmu::Mmu;
use serde_json::Value;

// Single-step vectors in the sm83 test suite layout. Code lives in WRAM so
// every listed address is writable. `cycles` is the expected M-cycle count.
const VECTORS: &str = r#"[
  {
    "name": "00 nop",
    "initial": { "a": 18, "f": 0, "b": 1, "c": 2, "d": 3, "e": 4, "h": 5, "l": 6, "sp": 57342, "pc": 49152,
                 "ram": [[49152, 0]] },
    "final":   { "a": 18, "f": 0, "b": 1, "c": 2, "d": 3, "e": 4, "h": 5, "l": 6, "sp": 57342, "pc": 49153,
                 "ram": [[49152, 0]] },
    "cycles": 1
  },
  {
    "name": "80 add a, b",
    "initial": { "a": 58, "f": 64, "b": 198, "c": 0, "d": 0, "e": 0, "h": 0, "l": 0, "sp": 57342, "pc": 49152,
                 "ram": [[49152, 128]] },
    "final":   { "a": 0, "f": 176, "b": 198, "c": 0, "d": 0, "e": 0, "h": 0, "l": 0, "sp": 57342, "pc": 49153,
                 "ram": [] },
    "cycles": 1
  },
  {
    "name": "90 sub b",
    "initial": { "a": 62, "f": 0, "b": 62, "c": 0, "d": 0, "e": 0, "h": 0, "l": 0, "sp": 57342, "pc": 49152,
                 "ram": [[49152, 144]] },
    "final":   { "a": 0, "f": 192, "b": 62, "c": 0, "d": 0, "e": 0, "h": 0, "l": 0, "sp": 57342, "pc": 49153,
                 "ram": [] },
    "cycles": 1
  },
  {
    "name": "27 daa",
    "initial": { "a": 125, "f": 0, "b": 0, "c": 0, "d": 0, "e": 0, "h": 0, "l": 0, "sp": 57342, "pc": 49152,
                 "ram": [[49152, 39]] },
    "final":   { "a": 131, "f": 0, "b": 0, "c": 0, "d": 0, "e": 0, "h": 0, "l": 0, "sp": 57342, "pc": 49153,
                 "ram": [] },
    "cycles": 1
  },
  {
    "name": "17 rla",
    "initial": { "a": 128, "f": 0, "b": 0, "c": 0, "d": 0, "e": 0, "h": 0, "l": 0, "sp": 57342, "pc": 49152,
                 "ram": [[49152, 23]] },
    "final":   { "a": 0, "f": 16, "b": 0, "c": 0, "d": 0, "e": 0, "h": 0, "l": 0, "sp": 57342, "pc": 49153,
                 "ram": [] },
    "cycles": 1
  },
  {
    "name": "3f ccf",
    "initial": { "a": 0, "f": 144, "b": 0, "c": 0, "d": 0, "e": 0, "h": 0, "l": 0, "sp": 57342, "pc": 49152,
                 "ram": [[49152, 63]] },
    "final":   { "a": 0, "f": 128, "b": 0, "c": 0, "d": 0, "e": 0, "h": 0, "l": 0, "sp": 57342, "pc": 49153,
                 "ram": [] },
    "cycles": 1
  },
  {
    "name": "f8 ld hl, sp+e8",
    "initial": { "a": 0, "f": 192, "b": 0, "c": 0, "d": 0, "e": 0, "h": 0, "l": 0, "sp": 57336, "pc": 49152,
                 "ram": [[49152, 248], [49153, 8]] },
    "final":   { "a": 0, "f": 48, "b": 0, "c": 0, "d": 0, "e": 0, "h": 224, "l": 0, "sp": 57336, "pc": 49154,
                 "ram": [] },
    "cycles": 3
  },
  {
    "name": "e8 add sp, e8",
    "initial": { "a": 0, "f": 0, "b": 0, "c": 0, "d": 0, "e": 0, "h": 0, "l": 0, "sp": 65528, "pc": 49152,
                 "ram": [[49152, 232], [49153, 255]] },
    "final":   { "a": 0, "f": 48, "b": 0, "c": 0, "d": 0, "e": 0, "h": 0, "l": 0, "sp": 65527, "pc": 49154,
                 "ram": [] },
    "cycles": 4
  },
  {
    "name": "cb 37 swap a",
    "initial": { "a": 240, "f": 112, "b": 0, "c": 0, "d": 0, "e": 0, "h": 0, "l": 0, "sp": 57342, "pc": 49152,
                 "ram": [[49152, 203], [49153, 55]] },
    "final":   { "a": 15, "f": 0, "b": 0, "c": 0, "d": 0, "e": 0, "h": 0, "l": 0, "sp": 57342, "pc": 49154,
                 "ram": [] },
    "cycles": 2
  },
  {
    "name": "cb 7e bit 7, (hl)",
    "initial": { "a": 0, "f": 16, "b": 0, "c": 0, "d": 0, "e": 0, "h": 193, "l": 0, "sp": 57342, "pc": 49152,
                 "ram": [[49152, 203], [49153, 126], [49408, 127]] },
    "final":   { "a": 0, "f": 176, "b": 0, "c": 0, "d": 0, "e": 0, "h": 193, "l": 0, "sp": 57342, "pc": 49154,
                 "ram": [[49408, 127]] },
    "cycles": 3
  },
  {
    "name": "34 inc (hl)",
    "initial": { "a": 0, "f": 16, "b": 0, "c": 0, "d": 0, "e": 0, "h": 193, "l": 0, "sp": 57342, "pc": 49152,
                 "ram": [[49152, 52], [49408, 15]] },
    "final":   { "a": 0, "f": 48, "b": 0, "c": 0, "d": 0, "e": 0, "h": 193, "l": 0, "sp": 57342, "pc": 49153,
                 "ram": [[49408, 16]] },
    "cycles": 3
  },
  {
    "name": "22 ld (hl+), a",
    "initial": { "a": 153, "f": 0, "b": 0, "c": 0, "d": 0, "e": 0, "h": 193, "l": 0, "sp": 57342, "pc": 49152,
                 "ram": [[49152, 34]] },
    "final":   { "a": 153, "f": 0, "b": 0, "c": 0, "d": 0, "e": 0, "h": 193, "l": 1, "sp": 57342, "pc": 49153,
                 "ram": [[49408, 153]] },
    "cycles": 2
  },
  {
    "name": "08 ld (a16), sp",
    "initial": { "a": 0, "f": 0, "b": 0, "c": 0, "d": 0, "e": 0, "h": 0, "l": 0, "sp": 48879, "pc": 49152,
                 "ram": [[49152, 8], [49153, 0], [49154, 193]] },
    "final":   { "a": 0, "f": 0, "b": 0, "c": 0, "d": 0, "e": 0, "h": 0, "l": 0, "sp": 48879, "pc": 49155,
                 "ram": [[49408, 239], [49409, 190]] },
    "cycles": 5
  },
  {
    "name": "c5 push bc",
    "initial": { "a": 0, "f": 0, "b": 18, "c": 52, "d": 0, "e": 0, "h": 0, "l": 0, "sp": 57342, "pc": 49152,
                 "ram": [[49152, 197]] },
    "final":   { "a": 0, "f": 0, "b": 18, "c": 52, "d": 0, "e": 0, "h": 0, "l": 0, "sp": 57340, "pc": 49153,
                 "ram": [[57341, 18], [57340, 52]] },
    "cycles": 4
  },
  {
    "name": "f1 pop af",
    "initial": { "a": 0, "f": 0, "b": 0, "c": 0, "d": 0, "e": 0, "h": 0, "l": 0, "sp": 57340, "pc": 49152,
                 "ram": [[49152, 241], [57340, 255], [57341, 86]] },
    "final":   { "a": 86, "f": 240, "b": 0, "c": 0, "d": 0, "e": 0, "h": 0, "l": 0, "sp": 57342, "pc": 49153,
                 "ram": [] },
    "cycles": 3
  },
  {
    "name": "cd call a16",
    "initial": { "a": 0, "f": 0, "b": 0, "c": 0, "d": 0, "e": 0, "h": 0, "l": 0, "sp": 57342, "pc": 49152,
                 "ram": [[49152, 205], [49153, 0], [49154, 194]] },
    "final":   { "a": 0, "f": 0, "b": 0, "c": 0, "d": 0, "e": 0, "h": 0, "l": 0, "sp": 57340, "pc": 49664,
                 "ram": [[57341, 192], [57340, 3]] },
    "cycles": 6
  },
  {
    "name": "20 jr nz, e8 (not taken)",
    "initial": { "a": 0, "f": 128, "b": 0, "c": 0, "d": 0, "e": 0, "h": 0, "l": 0, "sp": 57342, "pc": 49152,
                 "ram": [[49152, 32], [49153, 5]] },
    "final":   { "a": 0, "f": 128, "b": 0, "c": 0, "d": 0, "e": 0, "h": 0, "l": 0, "sp": 57342, "pc": 49154,
                 "ram": [] },
    "cycles": 2
  },
  {
    "name": "18 jr e8 (backwards)",
    "initial": { "a": 0, "f": 0, "b": 0, "c": 0, "d": 0, "e": 0, "h": 0, "l": 0, "sp": 57342, "pc": 49168,
                 "ram": [[49168, 24], [49169, 252]] },
    "final":   { "a": 0, "f": 0, "b": 0, "c": 0, "d": 0, "e": 0, "h": 0, "l": 0, "sp": 57342, "pc": 49166,
                 "ram": [] },
    "cycles": 3
  }
]"#;

fn field(state: &Value, name: &str) -> u64 {
    state[name].as_u64().unwrap_or_else(|| panic!("missing field {}", name))
}

fn ram_entries(state: &Value) -> Vec<(u16, u8)> {
    state["ram"]
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| (entry[0].as_u64().unwrap() as u16, entry[1].as_u64().unwrap() as u8))
        .collect()
}

fn load_state(cpu: &mut Cpu, mmu: &mut Mmu, state: &Value) {
    cpu.write_register(&Register::A, field(state, "a") as u8);
    cpu.registers.f = Flags::from_bits_truncate(field(state, "f") as u8);
    cpu.write_register(&Register::B, field(state, "b") as u8);
    cpu.write_register(&Register::C, field(state, "c") as u8);
    cpu.write_register(&Register::D, field(state, "d") as u8);
    cpu.write_register(&Register::E, field(state, "e") as u8);
    cpu.write_register(&Register::H, field(state, "h") as u8);
    cpu.write_register(&Register::L, field(state, "l") as u8);
    cpu.write_register16(&Register::SP, field(state, "sp") as u16);
    cpu.write_pc(field(state, "pc") as u16);

    for (addr, value) in ram_entries(state) {
        mmu.write(addr, value);
    }
}

fn check_state(cpu: &Cpu, mmu: &Mmu, state: &Value, name: &str) {
    for (register, key) in [
        (Register::A, "a"),
        (Register::B, "b"),
        (Register::C, "c"),
        (Register::D, "d"),
        (Register::E, "e"),
        (Register::H, "h"),
        (Register::L, "l"),
    ] {
        assert_eq!(
            cpu.read_register(&register) as u64,
            field(state, key),
            "Comparison with register {} failed for {}",
            key,
            name
        );
    }

    assert_eq!(cpu.registers.f.bits() as u64, field(state, "f"), "Comparison with register f failed for {}", name);
    assert_eq!(
        cpu.read_register16(&Register::SP) as u64,
        field(state, "sp"),
        "Comparison with register sp failed for {}",
        name
    );
    assert_eq!(cpu.read_pc() as u64, field(state, "pc"), "Comparison with register pc failed for {}", name);

    for (addr, value) in ram_entries(state) {
        assert_eq!(mmu.read(addr), value, "Comparison with RAM at {:04x} failed for {}", addr, name);
    }
}

#[test]
fn sm83_single_step_vectors() {
    let tests: Value = serde_json::from_str(VECTORS).unwrap();

    for test in tests.as_array().unwrap() {
        let name = test["name"].as_str().unwrap();
        let mut mmu = Mmu::new(None, Cartridge::from_rom(rom_with_header(0, 0, 0)).unwrap());
        let mut cpu = Cpu::new();

        load_state(&mut cpu, &mut mmu, &test["initial"]);
        let cycles = cpu.tick(&mut mmu, &RunOptions::default());

        assert_eq!(cycles as u64, field(test, "cycles"), "Cycle count failed for {}", name);
        check_state(&cpu, &mmu, &test["final"], name);
    }
}

#[test]
fn vectors_survive_tracing() {
    let tests: Value = serde_json::from_str(VECTORS).unwrap();
    let options = RunOptions { trace: true };

    for test in tests.as_array().unwrap() {
        let name = test["name"].as_str().unwrap();
        let mut mmu = Mmu::new(None, Cartridge::from_rom(rom_with_header(0, 0, 0)).unwrap());
        let mut cpu = Cpu::new();

        load_state(&mut cpu, &mut mmu, &test["initial"]);
        cpu.tick(&mut mmu, &options);
        check_state(&cpu, &mmu, &test["final"], name);
    }
}
