use super::DeviceHandler;

/// Banked ROM window.
///
/// The device is mapped over two ranges: the window itself, and a control
/// address whose writes select which bank backs the window. Reads of the
/// control address return the current bank number.
pub struct BankSwitch {
    window_base: u16,
    window_len: usize,
    control: u16,
    banks: Vec<Vec<u8>>,
    current: usize,
}

impl BankSwitch {
    /// Each bank is padded with zeros (or truncated) to `window_len`.
    pub fn new(window_base: u16, window_len: usize, control: u16, banks: Vec<Vec<u8>>) -> Self {
        let banks = banks
            .into_iter()
            .map(|mut b| {
                b.resize(window_len, 0);
                b
            })
            .collect();
        Self {
            window_base,
            window_len,
            control,
            banks,
            current: 0,
        }
    }

    pub fn current_bank(&self) -> usize {
        self.current
    }

    fn window_offset(&self, addr: u16) -> Option<usize> {
        let offset = addr.wrapping_sub(self.window_base) as usize;
        (addr >= self.window_base && offset < self.window_len).then_some(offset)
    }
}

impl DeviceHandler for BankSwitch {
    fn read(&mut self, addr: u16) -> u8 {
        self.peek(addr)
    }

    fn write(&mut self, addr: u16, data: u8) {
        if addr == self.control && !self.banks.is_empty() {
            self.current = data as usize % self.banks.len();
        }
    }

    fn peek(&self, addr: u16) -> u8 {
        if addr == self.control {
            return self.current as u8;
        }
        match (self.window_offset(addr), self.banks.get(self.current)) {
            (Some(offset), Some(bank)) => bank[offset],
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_banks() -> BankSwitch {
        BankSwitch::new(0x8000, 0x100, 0x9000, vec![vec![0xAA; 0x100], vec![0x55; 0x10]])
    }

    #[test]
    fn control_write_swaps_window() {
        let mut bank = two_banks();
        assert_eq!(bank.read(0x8000), 0xAA);
        bank.write(0x9000, 1);
        assert_eq!(bank.current_bank(), 1);
        assert_eq!(bank.read(0x8000), 0x55);
        // Short bank is zero padded.
        assert_eq!(bank.read(0x80FF), 0x00);
    }

    #[test]
    fn bank_number_wraps() {
        let mut bank = two_banks();
        bank.write(0x9000, 3);
        assert_eq!(bank.current_bank(), 1);
        assert_eq!(bank.read(0x9000), 1);
    }

    #[test]
    fn window_writes_are_ignored() {
        let mut bank = two_banks();
        bank.write(0x8010, 0x00);
        assert_eq!(bank.read(0x8010), 0xAA);
    }
}
