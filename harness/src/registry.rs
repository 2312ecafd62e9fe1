//! CPU registry for the run-log harness.
//!
//! Each CPU self-registers via [`inventory::submit!`] with a [`CpuEntry`]
//! holding its CLI name and a factory. The binary looks CPUs up by name
//! without a central list.

use eightbit_core::cpu::{M6502, M6800, M6809, Z80};

use crate::target::{Session, Target};

/// Name used when `--cpu` is not given.
pub const DEFAULT_CPU: &str = "6809";

pub struct CpuEntry {
    /// CLI name used to select this CPU (e.g., "z80").
    pub name: &'static str,
    pub description: &'static str,
    /// Factory: a CPU in its default state, ready for a run.
    pub create: fn() -> Box<dyn Target>,
}

impl CpuEntry {
    pub const fn new(
        name: &'static str,
        description: &'static str,
        create: fn() -> Box<dyn Target>,
    ) -> Self {
        Self {
            name,
            description,
            create,
        }
    }
}

inventory::collect!(CpuEntry);

fn m6800() -> Box<dyn Target> {
    Box::new(Session::<M6800>::new())
}

fn m6502() -> Box<dyn Target> {
    Box::new(Session::<M6502>::new())
}

fn z80() -> Box<dyn Target> {
    Box::new(Session::<Z80>::new())
}

fn m6809() -> Box<dyn Target> {
    Box::new(Session::<M6809>::new())
}

inventory::submit! { CpuEntry::new("6800", "Motorola 6800", m6800) }
inventory::submit! { CpuEntry::new("6502", "MOS 6502", m6502) }
inventory::submit! { CpuEntry::new("z80", "Zilog Z80", z80) }
inventory::submit! { CpuEntry::new("6809", "Motorola 6809", m6809) }

/// Return all registered CPUs, sorted by name.
pub fn all() -> Vec<&'static CpuEntry> {
    let mut entries: Vec<_> = inventory::iter::<CpuEntry>.into_iter().collect();
    entries.sort_by_key(|e| e.name);
    entries
}

/// Look up a CPU by its CLI name.
pub fn find(name: &str) -> Option<&'static CpuEntry> {
    inventory::iter::<CpuEntry>
        .into_iter()
        .find(|e| e.name.eq_ignore_ascii_case(name))
}
