use super::M6809;
use crate::core::Bus;

/// Width of a TFR/EXG register code: 0-5 name 16-bit registers
/// (D X Y U S PC), 8-11 name 8-bit ones (A B CC DP).
fn is_wide(code: u8) -> Option<bool> {
    match code {
        0..=5 => Some(true),
        8..=11 => Some(false),
        _ => None,
    }
}

impl M6809 {
    fn register(&self, code: u8) -> u16 {
        match code {
            0 => self.get_d(),
            1 => self.x,
            2 => self.y,
            3 => self.u,
            4 => self.s,
            5 => self.pc,
            8 => self.a as u16,
            9 => self.b as u16,
            10 => self.cc as u16,
            _ => self.dp as u16,
        }
    }

    fn set_register(&mut self, code: u8, value: u16) {
        match code {
            0 => self.set_d(value),
            1 => self.x = value,
            2 => self.y = value,
            3 => self.u = value,
            4 => self.s = value,
            5 => self.pc = value,
            8 => self.a = value as u8,
            9 => self.b = value as u8,
            10 => self.cc = value as u8,
            _ => self.dp = value as u8,
        }
    }

    /// Split a postbyte into (source, destination) when both codes exist
    /// and have the same width. Anything else leaves every register alone.
    fn register_pair<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) -> Option<(u8, u8)> {
        let post = self.fetch_byte(bus);
        let (src, dst) = (post >> 4, post & 0x0F);
        (is_wide(src)? == is_wide(dst)?).then_some((src, dst))
    }

    /// TFR (0x1F)
    pub(crate) fn op_tfr<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) {
        if let Some((src, dst)) = self.register_pair(bus) {
            self.set_register(dst, self.register(src));
        }
    }

    /// EXG (0x1E)
    pub(crate) fn op_exg<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) {
        if let Some((r1, r2)) = self.register_pair(bus) {
            let (v1, v2) = (self.register(r1), self.register(r2));
            self.set_register(r1, v2);
            self.set_register(r2, v1);
        }
    }
}
