#![allow(dead_code)]
//! Builders for synthetic `.asd` data.

pub const DEVICE_ID: u32 = 0x0469_2c61;

fn framed(s: &str) -> Vec<u8> {
    let mut dat = vec![0xFF, 0xFE, 0xFF];
    let units: Vec<u16> = s.encode_utf16().collect();
    dat.push(units.len() as u8);
    for unit in units {
        dat.extend_from_slice(&unit.to_le_bytes());
    }
    dat
}

/// File preamble with the given strings.
pub fn header(name: &str, suit_type: &str, weather: &str) -> Vec<u8> {
    let mut dat = vec![0x01, 0x00, 0x00, 0x00];
    dat.extend_from_slice(b"CTravelTrakCEDoc");
    dat.extend(framed(name));
    dat.extend([0u8; 38]);
    dat.extend(framed(suit_type));
    dat.extend([0u8; 2]);
    dat.extend(framed(weather));
    dat.extend([0u8; 27]);
    dat
}

/// A tagged dive record: summary, timeseries block, and footer.
pub struct Record {
    summary: [u8; 195],
    block: Vec<u8>,
}

impl Record {
    pub fn new() -> Self {
        let mut r = Record {
            summary: [0u8; 195],
            block: Vec::new(),
        };
        r.set_u32(8, DEVICE_ID);
        r
    }

    pub fn set_u16(&mut self, offset: usize, v: u16) -> &mut Self {
        self.summary[offset..offset + 2].copy_from_slice(&v.to_le_bytes());
        self
    }

    pub fn set_u32(&mut self, offset: usize, v: u32) -> &mut Self {
        self.summary[offset..offset + 4].copy_from_slice(&v.to_le_bytes());
        self
    }

    pub fn set_u64(&mut self, offset: usize, v: u64) -> &mut Self {
        self.summary[offset..offset + 8].copy_from_slice(&v.to_le_bytes());
        self
    }

    pub fn sequence(&mut self, seq: u16) -> &mut Self {
        self.set_u16(28, seq)
    }

    /// Min and max temperature in tenths of a degree.
    pub fn temperatures(&mut self, min: i16, max: i16) -> &mut Self {
        self.set_u16(46, min as u16).set_u16(160, max as u16)
    }

    pub fn block(&mut self, block: &[u8]) -> &mut Self {
        self.block = block.to_vec();
        self
    }

    pub fn bytes(&self) -> Vec<u8> {
        let mut summary = self.summary;
        summary[191..193].copy_from_slice(&(self.block.len() as u16).to_le_bytes());
        let mut dat = summary.to_vec();
        dat.extend_from_slice(&self.block);
        dat.extend_from_slice(&[0u8; 8]);
        dat
    }
}
