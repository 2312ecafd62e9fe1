/// Byte order used when a CPU composes a 16-bit word from two bus reads.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endian {
    /// High byte at the lower address (6800, 6809).
    Big,
    /// Low byte at the lower address (6502, Z80).
    Little,
}

/// Memory interface every CPU core steps against.
///
/// Word accesses are always two independent byte accesses, so an
/// implementation never sees a 16-bit request and must not assume both
/// halves land in the same region.
pub trait Bus {
    type Address: Copy + Into<u64>; // u16 for every CPU in this crate
    type Data; // u8

    fn read(&mut self, addr: Self::Address) -> Self::Data;
    fn write(&mut self, addr: Self::Address, data: Self::Data);

    /// Read from I/O port address space (separate from memory on Z80).
    /// Default maps to memory read; override for CPUs with separate I/O.
    fn io_read(&mut self, addr: Self::Address) -> Self::Data {
        self.read(addr)
    }

    /// Write to I/O port address space (separate from memory on Z80).
    /// Default maps to memory write; override for CPUs with separate I/O.
    fn io_write(&mut self, addr: Self::Address, data: Self::Data) {
        self.write(addr, data)
    }
}

/// Read a 16-bit word as two sequential byte reads.
#[inline]
pub fn read_word<B: Bus<Address = u16, Data = u8> + ?Sized>(
    bus: &mut B,
    addr: u16,
    endian: Endian,
) -> u16 {
    let first = bus.read(addr);
    let second = bus.read(addr.wrapping_add(1));
    match endian {
        Endian::Big => u16::from_be_bytes([first, second]),
        Endian::Little => u16::from_le_bytes([first, second]),
    }
}

/// Write a 16-bit word as two sequential byte writes, lower address first.
#[inline]
pub fn write_word<B: Bus<Address = u16, Data = u8> + ?Sized>(
    bus: &mut B,
    addr: u16,
    data: u16,
    endian: Endian,
) {
    let [first, second] = match endian {
        Endian::Big => data.to_be_bytes(),
        Endian::Little => data.to_le_bytes(),
    };
    bus.write(addr, first);
    bus.write(addr.wrapping_add(1), second);
}

/// Interrupt requests the caller hands to `step`.
///
/// The interrupt controller clears a line once it has been serviced; a
/// masked IRQ stays set for the next check.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingInterrupts {
    pub nmi: bool,
    pub irq: bool,
    pub firq: bool,     // 6809-specific; ignored by other CPUs
    pub irq_vector: u8, // Z80 data-bus byte during IRQ acknowledge (IM0/IM2)
}

impl PendingInterrupts {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn nmi() -> Self {
        Self {
            nmi: true,
            ..Self::default()
        }
    }

    pub fn irq() -> Self {
        Self {
            irq: true,
            ..Self::default()
        }
    }

    pub fn any(&self) -> bool {
        self.nmi || self.irq || self.firq
    }
}
