use eightbit_harness::registry;
use eightbit_harness::{HarnessError, MemInit, RunConfig, RunLog, Target, record, replay};
use rand::Rng;

fn cpu(name: &str) -> Box<dyn Target> {
    (registry::find(name).unwrap().create)()
}

// =============================================================================
// 6502
// =============================================================================

/// LDX #$00 / loop: TXA / STA $0300,X / INX / BNE loop
const M6502_PROGRAM: [u8; 9] = [0xA2, 0x00, 0x8A, 0x9D, 0x00, 0x03, 0xE8, 0xD0, 0xF9];

fn m6502_config(instructions: usize) -> RunConfig {
    let mut registers = toml::Table::new();
    registers.insert("pc".into(), toml::Value::Integer(0x0200));
    registers.insert("sp".into(), toml::Value::Integer(0xFD));
    RunConfig {
        load_addr: 0x0200,
        instructions,
        registers: Some(registers),
        ..RunConfig::default()
    }
}

#[test]
fn test_m6502_record_then_replay() {
    let config = m6502_config(200);
    let log = record(cpu("6502").as_mut(), &config, &M6502_PROGRAM, "fill.bin", false).unwrap();
    assert_eq!(log.states.len(), 201);
    assert_eq!(log.states[0].regs["pc"], 0x0200);
    assert_eq!(log.states[0].regs["sp"], 0xFD);

    let result = replay(cpu("6502").as_mut(), &log, &M6502_PROGRAM, true, false).unwrap();
    assert_eq!(result.instructions, 200);
    assert_eq!(result.cycles, log.states[200].cycles);
}

#[test]
fn test_replay_detects_register_mismatch() {
    let mut log = record(cpu("6502").as_mut(), &m6502_config(20), &M6502_PROGRAM, "fill.bin", false).unwrap();
    log.states[7].regs["a"] = serde_json::json!(0x99);

    let err = replay(cpu("6502").as_mut(), &log, &M6502_PROGRAM, true, false).unwrap_err();
    assert!(matches!(
        err,
        HarnessError::Mismatch {
            step: 7,
            field: "registers",
            ..
        }
    ));
}

#[test]
fn test_replay_detects_digest_mismatch() {
    let mut log = record(cpu("6502").as_mut(), &m6502_config(20), &M6502_PROGRAM, "fill.bin", false).unwrap();
    let step = log.states.iter().rposition(|s| s.digest.is_some()).unwrap();
    log.states[step].digest = Some("0".repeat(40));

    let err = replay(cpu("6502").as_mut(), &log, &M6502_PROGRAM, true, false).unwrap_err();
    assert!(matches!(err, HarnessError::Mismatch { field: "memory digest", .. }));

    // Same log passes once digests are not checked
    replay(cpu("6502").as_mut(), &log, &M6502_PROGRAM, false, false).unwrap();
}

#[test]
fn test_replay_detects_cycle_mismatch() {
    let mut log = record(cpu("6502").as_mut(), &m6502_config(10), &M6502_PROGRAM, "fill.bin", false).unwrap();
    for state in &mut log.states[3..] {
        state.cycles += 1;
    }

    let err = replay(cpu("6502").as_mut(), &log, &M6502_PROGRAM, false, false).unwrap_err();
    assert!(matches!(err, HarnessError::Mismatch { step: 3, field: "cycles", .. }));
}

#[test]
fn test_replay_against_different_image_fails() {
    let log = record(cpu("6502").as_mut(), &m6502_config(10), &M6502_PROGRAM, "fill.bin", false).unwrap();
    let mut other = M6502_PROGRAM;
    other[1] = 0x10;

    let err = replay(cpu("6502").as_mut(), &log, &other, true, false).unwrap_err();
    assert!(matches!(err, HarnessError::Mismatch { step: 0, field: "memory digest", .. }));
}

#[test]
fn test_empty_log_is_rejected() {
    let log = RunLog {
        file_name: "none.bin".into(),
        load_addr: 0,
        memory: vec![],
        states: vec![],
    };
    assert!(matches!(
        replay(cpu("6809").as_mut(), &log, &[], true, false),
        Err(HarnessError::EmptyLog)
    ));
}

// =============================================================================
// Early stops
// =============================================================================

#[test]
fn test_illegal_opcode_ends_recording() {
    // NOP, NOP, then an undefined 6800 opcode
    let config = RunConfig {
        load_addr: 0x0100,
        instructions: 50,
        registers: Some(toml::from_str("pc = 0x0100\nsp = 0x01FF").unwrap()),
        ..RunConfig::default()
    };
    let log = record(cpu("6800").as_mut(), &config, &[0x01, 0x01, 0x00], "bad.bin", false).unwrap();

    assert_eq!(log.states.len(), 4);
    let last = log.states.last().unwrap();
    assert_eq!(last.regs["pc"], 0x0103);
    assert!(last.digest.is_some());
}

#[test]
fn test_halt_ends_z80_recording() {
    // LD A,0x42 / LD (0x8000),A / HALT
    let config = RunConfig {
        load_addr: 0x0000,
        instructions: 50,
        ..RunConfig::default()
    };
    let program = [0x3E, 0x42, 0x32, 0x00, 0x80, 0x76];
    let log = record(cpu("z80").as_mut(), &config, &program, "halt.bin", false).unwrap();

    assert_eq!(log.states.len(), 4);
    assert_eq!(log.states[3].regs["a"], 0x42);
    assert_eq!(log.states[0].regs["im"], 0);

    replay(cpu("z80").as_mut(), &log, &program, true, false).unwrap();
}

// =============================================================================
// Files
// =============================================================================

#[test]
fn test_log_survives_a_file_round_trip() {
    let dir = std::env::temp_dir().join("eightbit_record_replay_test_file");
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();

    let image_path = dir.join("fill.bin");
    std::fs::write(&image_path, M6502_PROGRAM).unwrap();
    let log_path = dir.join("fill.json");

    let image = eightbit_harness::image::load_image(&image_path).unwrap();
    let log = record(cpu("6502").as_mut(), &m6502_config(64), &image, "fill.bin", false).unwrap();
    log.save(&log_path).unwrap();

    let loaded = RunLog::load(&log_path).unwrap();
    assert_eq!(loaded, log);
    // file_name is resolved next to the log
    let image = eightbit_harness::image::load_image(&loaded.image_path(&log_path)).unwrap();
    replay(cpu("6502").as_mut(), &loaded, &image, true, false).unwrap();

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_rom_blocks_ignore_writes() {
    // LDA #$55 / STA $F000 / LDA $F000
    let config = RunConfig {
        load_addr: 0x0200,
        instructions: 3,
        memory: vec![
            MemInit {
                base: 0,
                size: 0xF000,
                writeable: true,
            },
            MemInit {
                base: 0xF000,
                size: 0x1000,
                writeable: false,
            },
        ],
        registers: Some(toml::from_str("pc = 0x0200").unwrap()),
        ..RunConfig::default()
    };
    let program = [0xA9, 0x55, 0x8D, 0x00, 0xF0, 0xAD, 0x00, 0xF0];
    let log = record(cpu("6502").as_mut(), &config, &program, "rom.bin", false).unwrap();

    assert_eq!(log.states[3].regs["a"], 0x00);
    // Nothing was written, so only the first and last states are hashed
    assert!(log.states[2].digest.is_none());
}

#[test]
fn test_random_images_replay_cleanly() {
    let mut rng = rand::thread_rng();
    for _ in 0..10 {
        // Random code on a 6809 mostly stops on an illegal opcode or runs off
        // into zeroes; either way a replay must agree with the recording.
        let image: Vec<u8> = (0..64).map(|_| rng.r#gen()).collect();
        let config = RunConfig {
            instructions: 40,
            ..RunConfig::default()
        };
        let log = record(cpu("6809").as_mut(), &config, &image, "random.bin", false).unwrap();
        replay(cpu("6809").as_mut(), &log, &image, true, false).unwrap();
    }
}
