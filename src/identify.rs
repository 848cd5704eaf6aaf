//! Decoding of the Identify Controller data structure (CNS 01h).
//!
//! The controller writes every multi-byte field little-endian regardless of
//! the host. Decoding reads each scalar with an explicit [`ByteOrder`] rather
//! than reinterpreting the buffer in place, so the same code gives the same
//! answer on any host and the byte order can be exercised in tests.

use crate::error::{IdentifyError, Result};
use crate::nvme::{IdentifyBuffer, IDENTIFY_DATA_LEN};
use bytes::{Buf, BufMut};
use serde::{Serialize, Serializer};
use std::borrow::Cow;
use std::fmt;

pub const POWER_STATE_DESCRIPTORS: usize = 32;
pub const POWER_STATE_DESCRIPTOR_LEN: usize = 32;
pub const VENDOR_SPECIFIC_LEN: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Little,
    Big,
}

impl ByteOrder {
    #[cfg(target_endian = "little")]
    pub const NATIVE: Self = ByteOrder::Little;
    #[cfg(target_endian = "big")]
    pub const NATIVE: Self = ByteOrder::Big;

    /// The order NVMe data structures use on the wire.
    pub const PROTOCOL: Self = ByteOrder::Little;
}

struct Reader<'a> {
    buf: &'a [u8],
    order: ByteOrder,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8], order: ByteOrder) -> Self {
        Self { buf, order }
    }

    fn skip(&mut self, n: usize) -> &mut Self {
        self.buf.advance(n);
        self
    }

    fn u8(&mut self) -> u8 {
        self.buf.get_u8()
    }

    fn u16(&mut self) -> u16 {
        match self.order {
            ByteOrder::Little => self.buf.get_u16_le(),
            ByteOrder::Big => self.buf.get_u16(),
        }
    }

    fn u32(&mut self) -> u32 {
        match self.order {
            ByteOrder::Little => self.buf.get_u32_le(),
            ByteOrder::Big => self.buf.get_u32(),
        }
    }

    fn u128(&mut self) -> u128 {
        match self.order {
            ByteOrder::Little => self.buf.get_u128_le(),
            ByteOrder::Big => self.buf.get_u128(),
        }
    }

    fn array<const N: usize>(&mut self) -> [u8; N] {
        let mut out = [0u8; N];
        self.buf.copy_to_slice(&mut out);
        out
    }

    fn remaining(&self) -> usize {
        self.buf.remaining()
    }
}

/// A fixed-width ASCII field, left-justified and padded on the right.
///
/// The raw bytes are kept as received. Padding (spaces or NULs) is only
/// stripped from the end when the text is viewed.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct FixedText<const N: usize>([u8; N]);

impl<const N: usize> FixedText<N> {
    pub fn new(raw: [u8; N]) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> &[u8; N] {
        &self.0
    }

    /// The field without its trailing run of spaces and NULs.
    pub fn trimmed(&self) -> &[u8] {
        let end = self.0.iter().rposition(|&b| b != b' ' && b != 0).map_or(0, |i| i + 1);
        &self.0[..end]
    }

    pub fn to_str_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.trimmed())
    }
}

impl<const N: usize> Default for FixedText<N> {
    fn default() -> Self {
        Self([0; N])
    }
}

impl<const N: usize> fmt::Display for FixedText<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_str_lossy())
    }
}

impl<const N: usize> fmt::Debug for FixedText<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.to_str_lossy())
    }
}

impl<const N: usize> PartialEq<str> for FixedText<N> {
    fn eq(&self, other: &str) -> bool {
        self.trimmed() == other.as_bytes()
    }
}

impl<const N: usize> PartialEq<&str> for FixedText<N> {
    fn eq(&self, other: &&str) -> bool {
        self.trimmed() == other.as_bytes()
    }
}

impl<const N: usize> Serialize for FixedText<N> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_str_lossy())
    }
}

/// One entry of the power state table (32 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PowerStateDescriptor {
    /// MP, in units selected by [`Self::max_power_watts`].
    pub max_power: u16,
    /// Bit 0: max power scale, bit 1: non-operational state.
    pub flags: u8,
    pub entry_latency_us: u32,
    pub exit_latency_us: u32,
    pub relative_read_throughput: u8,
    pub relative_read_latency: u8,
    pub relative_write_throughput: u8,
    pub relative_write_latency: u8,
    pub idle_power: u16,
    /// Bits 7:6 hold the idle power scale.
    pub idle_power_scale: u8,
    pub active_power: u16,
    /// Bits 2:0 active power workload, bits 7:6 active power scale.
    pub active_power_workload_scale: u8,
}

impl PowerStateDescriptor {
    const FLAG_MAX_POWER_SCALE: u8 = 1 << 0;
    const FLAG_NON_OPERATIONAL: u8 = 1 << 1;

    pub fn decode(bytes: &[u8; POWER_STATE_DESCRIPTOR_LEN], order: ByteOrder) -> Self {
        Self::read(&mut Reader::new(bytes, order))
    }

    fn read(r: &mut Reader<'_>) -> Self {
        let psd = Self {
            max_power: r.u16(),
            flags: r.skip(1).u8(),
            entry_latency_us: r.u32(),
            exit_latency_us: r.u32(),
            relative_read_throughput: r.u8(),
            relative_read_latency: r.u8(),
            relative_write_throughput: r.u8(),
            relative_write_latency: r.u8(),
            idle_power: r.u16(),
            idle_power_scale: r.u8(),
            active_power: r.skip(1).u16(),
            active_power_workload_scale: r.u8(),
        };
        r.skip(9);
        psd
    }

    /// Lays the descriptor out in wire format. Reserved bytes are zero.
    pub fn encode(&self, order: ByteOrder) -> [u8; POWER_STATE_DESCRIPTOR_LEN] {
        let mut out = [0u8; POWER_STATE_DESCRIPTOR_LEN];
        let mut w = &mut out[..];
        match order {
            ByteOrder::Little => w.put_u16_le(self.max_power),
            ByteOrder::Big => w.put_u16(self.max_power),
        }
        w.put_u8(0);
        w.put_u8(self.flags);
        match order {
            ByteOrder::Little => {
                w.put_u32_le(self.entry_latency_us);
                w.put_u32_le(self.exit_latency_us);
            }
            ByteOrder::Big => {
                w.put_u32(self.entry_latency_us);
                w.put_u32(self.exit_latency_us);
            }
        }
        w.put_u8(self.relative_read_throughput);
        w.put_u8(self.relative_read_latency);
        w.put_u8(self.relative_write_throughput);
        w.put_u8(self.relative_write_latency);
        match order {
            ByteOrder::Little => w.put_u16_le(self.idle_power),
            ByteOrder::Big => w.put_u16(self.idle_power),
        }
        w.put_u8(self.idle_power_scale);
        w.put_u8(0);
        match order {
            ByteOrder::Little => w.put_u16_le(self.active_power),
            ByteOrder::Big => w.put_u16(self.active_power),
        }
        w.put_u8(self.active_power_workload_scale);
        out
    }

    /// Maximum power draw: MP in centiwatts, or in 0.0001 W when the max
    /// power scale flag is set.
    pub fn max_power_watts(&self) -> f64 {
        if self.flags & Self::FLAG_MAX_POWER_SCALE != 0 {
            f64::from(self.max_power) * 0.0001
        } else {
            f64::from(self.max_power) * 0.01
        }
    }

    pub fn is_non_operational(&self) -> bool {
        self.flags & Self::FLAG_NON_OPERATIONAL != 0
    }
}

/// Identify Controller data, decoded field by field from the 4096-byte response.
///
/// Reserved ranges are not kept. Values are passed through as the controller
/// reported them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentifyController {
    pub vendor_id: u16,
    pub subsystem_vendor_id: u16,
    pub serial_number: FixedText<20>,
    pub model_number: FixedText<40>,
    pub firmware_revision: FixedText<8>,
    pub recommended_arbitration_burst: u8,
    /// IEEE OUI, least significant byte first.
    pub ieee: [u8; 3],
    pub cmic: u8,
    /// Maximum data transfer size, as a power of two of the minimum page size.
    pub mdts: u8,
    pub controller_id: u16,
    pub version: u32,
    pub rtd3_resume_latency_us: u32,
    pub rtd3_entry_latency_us: u32,
    pub oaes: u32,
    pub oacs: u16,
    pub abort_command_limit: u8,
    pub async_event_request_limit: u8,
    pub firmware_updates: u8,
    pub log_page_attributes: u8,
    pub error_log_page_entries: u8,
    /// Number of power states supported, zero-based.
    pub npss: u8,
    pub avscc: u8,
    pub apsta: u8,
    /// Kelvin.
    pub warning_composite_temp: u16,
    /// Kelvin.
    pub critical_composite_temp: u16,
    pub max_firmware_activation_time: u16,
    pub hmb_preferred_size: u32,
    pub hmb_minimum_size: u32,
    pub total_capacity: u128,
    pub unallocated_capacity: u128,
    pub rpmb_support: u32,
    pub sqes: u8,
    pub cqes: u8,
    pub namespace_count: u32,
    pub oncs: u16,
    pub fuses: u16,
    pub format_nvm_attributes: u8,
    pub volatile_write_cache: u8,
    pub atomic_write_unit_normal: u16,
    pub atomic_write_unit_power_fail: u16,
    pub nvscc: u8,
    pub atomic_compare_write_unit: u16,
    pub sgl_support: u32,
    /// All 32 descriptors in power state order. Only the first
    /// [`Self::power_state_count`] are meaningful.
    pub power_states: [PowerStateDescriptor; POWER_STATE_DESCRIPTORS],
    pub vendor_specific: Vec<u8>,
}

impl IdentifyController {
    pub const SIZE: usize = IDENTIFY_DATA_LEN;

    /// Decodes a response in the protocol's little-endian byte order.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::decode(bytes, ByteOrder::PROTOCOL)
    }

    /// Decodes a response using `order` for every multi-byte field.
    ///
    /// Anything but exactly [`Self::SIZE`] bytes is rejected before any field
    /// is read.
    pub fn decode(bytes: &[u8], order: ByteOrder) -> Result<Self> {
        if bytes.len() != Self::SIZE {
            return Err(IdentifyError::InvalidBufferSize { expected: Self::SIZE, actual: bytes.len() });
        }
        Ok(Self::read(Reader::new(bytes, order)))
    }

    pub fn from_buffer(buf: &IdentifyBuffer) -> Self {
        Self::read(Reader::new(buf.as_bytes(), ByteOrder::PROTOCOL))
    }

    fn read(mut r: Reader<'_>) -> Self {
        // Struct expression fields are evaluated in the order written, which
        // is wire order.
        let mut id = Self {
            vendor_id: r.u16(),
            subsystem_vendor_id: r.u16(),
            serial_number: FixedText(r.array()),
            model_number: FixedText(r.array()),
            firmware_revision: FixedText(r.array()),
            recommended_arbitration_burst: r.u8(),
            ieee: r.array(),
            cmic: r.u8(),
            mdts: r.u8(),
            controller_id: r.u16(),
            version: r.u32(),
            rtd3_resume_latency_us: r.u32(),
            rtd3_entry_latency_us: r.u32(),
            oaes: r.u32(),
            oacs: r.skip(160).u16(),
            abort_command_limit: r.u8(),
            async_event_request_limit: r.u8(),
            firmware_updates: r.u8(),
            log_page_attributes: r.u8(),
            error_log_page_entries: r.u8(),
            npss: r.u8(),
            avscc: r.u8(),
            apsta: r.u8(),
            warning_composite_temp: r.u16(),
            critical_composite_temp: r.u16(),
            max_firmware_activation_time: r.u16(),
            hmb_preferred_size: r.u32(),
            hmb_minimum_size: r.u32(),
            total_capacity: r.u128(),
            unallocated_capacity: r.u128(),
            rpmb_support: r.u32(),
            sqes: r.skip(196).u8(),
            cqes: r.u8(),
            namespace_count: r.skip(2).u32(),
            oncs: r.u16(),
            fuses: r.u16(),
            format_nvm_attributes: r.u8(),
            volatile_write_cache: r.u8(),
            atomic_write_unit_normal: r.u16(),
            atomic_write_unit_power_fail: r.u16(),
            nvscc: r.u8(),
            atomic_compare_write_unit: r.skip(1).u16(),
            sgl_support: r.skip(2).u32(),
            power_states: [PowerStateDescriptor::default(); POWER_STATE_DESCRIPTORS],
            vendor_specific: Vec::new(),
        };
        r.skip(1508);
        for psd in id.power_states.iter_mut() {
            *psd = PowerStateDescriptor::read(&mut r);
        }
        id.vendor_specific = r.array::<VENDOR_SPECIFIC_LEN>().to_vec();
        debug_assert_eq!(r.remaining(), 0);
        id
    }

    pub fn serial(&self) -> Cow<'_, str> {
        self.serial_number.to_str_lossy()
    }

    pub fn model(&self) -> Cow<'_, str> {
        self.model_number.to_str_lossy()
    }

    pub fn firmware(&self) -> Cow<'_, str> {
        self.firmware_revision.to_str_lossy()
    }

    /// The 24-bit IEEE OUI.
    pub fn ieee_oui(&self) -> u32 {
        u32::from(self.ieee[2]) << 16 | u32::from(self.ieee[1]) << 8 | u32::from(self.ieee[0])
    }

    /// NVMe version as (major, minor, tertiary). All zero for pre-1.2 controllers.
    pub fn spec_version(&self) -> (u16, u8, u8) {
        ((self.version >> 16) as u16, (self.version >> 8) as u8, self.version as u8)
    }

    /// Largest transfer in bytes given the controller's minimum page size,
    /// or `None` when the controller reports no limit.
    pub fn max_transfer(&self, min_page_size: usize) -> Option<usize> {
        if self.mdts == 0 {
            return None;
        }
        1usize.checked_shl(u32::from(self.mdts))?.checked_mul(min_page_size)
    }

    /// Number of power states the controller declares (NPSS is zero-based).
    pub fn power_state_count(&self) -> usize {
        (usize::from(self.npss) + 1).min(POWER_STATE_DESCRIPTORS)
    }

    pub fn reported_power_states(&self) -> &[PowerStateDescriptor] {
        &self.power_states[..self.power_state_count()]
    }

    pub fn warning_temp_celsius(&self) -> Option<i32> {
        kelvin_to_celsius(self.warning_composite_temp)
    }

    pub fn critical_temp_celsius(&self) -> Option<i32> {
        kelvin_to_celsius(self.critical_composite_temp)
    }
}

fn kelvin_to_celsius(k: u16) -> Option<i32> {
    (k != 0).then(|| i32::from(k) - 273)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn put(buf: &mut [u8], offset: usize, bytes: &[u8]) {
        buf[offset..offset + bytes.len()].copy_from_slice(bytes);
    }

    fn padded<const N: usize>(s: &str, pad: u8) -> [u8; N] {
        let mut out = [pad; N];
        out[..s.len()].copy_from_slice(s.as_bytes());
        out
    }

    fn sample_psd() -> PowerStateDescriptor {
        PowerStateDescriptor {
            max_power: 0x0226,
            flags: 0x01,
            entry_latency_us: 0x0001_0203,
            exit_latency_us: 0x0a0b_0c0d,
            relative_read_throughput: 1,
            relative_read_latency: 2,
            relative_write_throughput: 3,
            relative_write_latency: 4,
            idle_power: 0x1234,
            idle_power_scale: 0x80,
            active_power: 0xbeef,
            active_power_workload_scale: 0x42,
        }
    }

    #[test]
    fn text_trailing_spaces_trimmed() {
        let mn = FixedText::<40>::new(padded("MODEL-X", b' '));
        assert_eq!(mn.to_str_lossy(), "MODEL-X");
        assert_eq!(mn.raw().len(), 40);
    }

    #[test]
    fn text_interior_spaces_kept() {
        let mn = FixedText::<40>::new(padded("MODEL X", b' '));
        assert_eq!(mn.to_str_lossy(), "MODEL X");
        assert_eq!(mn, "MODEL X");
        assert_ne!(mn, "MODEL");
    }

    #[test]
    fn text_nul_and_mixed_padding() {
        let fr = FixedText::<8>::new(padded("2B2Q", 0));
        assert_eq!(fr, "2B2Q");

        let mut raw = padded::<20>("S466", b' ');
        raw[6] = 0;
        raw[19] = 0;
        assert_eq!(FixedText::new(raw), "S466");
    }

    #[test]
    fn text_leading_space_and_blank_field() {
        assert_eq!(FixedText::<8>::new(*b"  A B   ").to_string(), "  A B");
        assert!(FixedText::<8>::new([b' '; 8]).trimmed().is_empty());
        assert!(FixedText::<8>::default().trimmed().is_empty());
    }

    #[test]
    fn wrong_length_is_rejected() {
        for len in [0, 4095, 4097] {
            let buf = vec![0u8; len];
            match IdentifyController::from_bytes(&buf) {
                Err(IdentifyError::InvalidBufferSize { expected, actual }) => {
                    assert_eq!(expected, 4096);
                    assert_eq!(actual, len);
                }
                other => panic!("expected InvalidBufferSize for {len} bytes, got {other:?}"),
            }
        }
    }

    #[test]
    fn all_zero_buffer_decodes() {
        let id = IdentifyController::from_bytes(&[0u8; 4096]).unwrap();
        assert_eq!(id.vendor_id, 0);
        assert_eq!(id.model(), "");
        assert_eq!(id.power_state_count(), 1);
        assert_eq!(id.vendor_specific.len(), VENDOR_SPECIFIC_LEN);
        assert_eq!(id.max_transfer(4096), None);
        assert_eq!(id.warning_temp_celsius(), None);
    }

    #[test]
    fn fields_land_at_wire_offsets() {
        let mut buf = vec![0u8; 4096];
        put(&mut buf, 0, &0x144du16.to_le_bytes());
        put(&mut buf, 2, &0x144du16.to_le_bytes());
        put(&mut buf, 4, &padded::<20>("S466NX0K123456", b' '));
        put(&mut buf, 24, &padded::<40>("Samsung SSD 970 EVO", b' '));
        put(&mut buf, 64, b"2B2QEXM7");
        put(&mut buf, 72, &[2, 0x38, 0x25, 0x00, 0, 9]);
        put(&mut buf, 78, &4u16.to_le_bytes());
        put(&mut buf, 80, &0x0001_0300u32.to_le_bytes());
        put(&mut buf, 256, &0x0017u16.to_le_bytes());
        buf[263] = 4;
        put(&mut buf, 266, &358u16.to_le_bytes());
        put(&mut buf, 268, &360u16.to_le_bytes());
        put(&mut buf, 280, &500_107_862_016u128.to_le_bytes());
        buf[512] = 0x66;
        buf[513] = 0x44;
        put(&mut buf, 516, &1u32.to_le_bytes());
        put(&mut buf, 520, &0x005fu16.to_le_bytes());
        buf[525] = 0x07;
        put(&mut buf, 536, &0x0020_0001u32.to_le_bytes());
        put(&mut buf, 2048, &sample_psd().encode(ByteOrder::Little));
        put(&mut buf, 2048 + 31 * 32, &sample_psd().encode(ByteOrder::Little));
        buf[3072] = 0xaa;
        buf[4095] = 0xbb;

        let id = IdentifyController::from_bytes(&buf).unwrap();
        assert_eq!(id.vendor_id, 0x144d);
        assert_eq!(id.subsystem_vendor_id, 0x144d);
        assert_eq!(id.serial(), "S466NX0K123456");
        assert_eq!(id.model(), "Samsung SSD 970 EVO");
        assert_eq!(id.firmware(), "2B2QEXM7");
        assert_eq!(id.recommended_arbitration_burst, 2);
        assert_eq!(id.ieee_oui(), 0x00_2538);
        assert_eq!(id.mdts, 9);
        assert_eq!(id.controller_id, 4);
        assert_eq!(id.spec_version(), (1, 3, 0));
        assert_eq!(id.oacs, 0x0017);
        assert_eq!(id.npss, 4);
        assert_eq!(id.warning_temp_celsius(), Some(85));
        assert_eq!(id.critical_temp_celsius(), Some(87));
        assert_eq!(id.total_capacity, 500_107_862_016);
        assert_eq!((id.sqes, id.cqes), (0x66, 0x44));
        assert_eq!(id.namespace_count, 1);
        assert_eq!(id.oncs, 0x005f);
        assert_eq!(id.volatile_write_cache, 0x07);
        assert_eq!(id.sgl_support, 0x0020_0001);
        assert_eq!(id.power_states[0], sample_psd());
        assert_eq!(id.power_states[31], sample_psd());
        assert_eq!(id.power_states[1], PowerStateDescriptor::default());
        assert_eq!(id.vendor_specific[0], 0xaa);
        assert_eq!(id.vendor_specific[1023], 0xbb);
        assert_eq!(id.max_transfer(4096), Some(2 * 1024 * 1024));
        assert_eq!(id.reported_power_states().len(), 5);
    }

    #[test]
    fn byte_order_is_explicit() {
        let mut buf = vec![0u8; 4096];
        put(&mut buf, 0, &[0x4d, 0x14]);
        put(&mut buf, 80, &[0x00, 0x03, 0x01, 0x00]);

        let le = IdentifyController::decode(&buf, ByteOrder::Little).unwrap();
        let be = IdentifyController::decode(&buf, ByteOrder::Big).unwrap();
        assert_eq!(le.vendor_id, 0x144d);
        assert_eq!(be.vendor_id, 0x4d14);
        assert_eq!(le.version, 0x0001_0300);
        assert_eq!(be.version, 0x0003_0100);

        let native = IdentifyController::decode(&buf, ByteOrder::NATIVE).unwrap();
        assert_eq!(native.vendor_id, u16::from_ne_bytes([0x4d, 0x14]));
    }

    #[test]
    fn from_buffer_matches_from_bytes() {
        let mut buf = IdentifyBuffer::default();
        put(buf.as_mut_bytes(), 24, &padded::<40>("MODEL X", b' '));
        let a = IdentifyController::from_buffer(&buf);
        let b = IdentifyController::from_bytes(buf.as_bytes()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.model_number, "MODEL X");
    }

    #[test]
    fn power_state_round_trip() {
        for order in [ByteOrder::Little, ByteOrder::Big] {
            let psd = sample_psd();
            assert_eq!(PowerStateDescriptor::decode(&psd.encode(order), order), psd);
        }

        // Any bytes with zeroed reserved fields survive decode then encode.
        let mut raw = [0u8; 32];
        for (i, b) in raw.iter_mut().enumerate() {
            *b = (i as u8).wrapping_mul(37).wrapping_add(11);
        }
        for reserved in [2, 19, 23, 24, 25, 26, 27, 28, 29, 30, 31] {
            raw[reserved] = 0;
        }
        let psd = PowerStateDescriptor::decode(&raw, ByteOrder::Little);
        assert_eq!(psd.encode(ByteOrder::Little), raw);
    }

    #[test]
    fn power_state_layout() {
        let raw = sample_psd().encode(ByteOrder::Little);
        assert_eq!(&raw[0..2], &[0x26, 0x02]);
        assert_eq!(raw[3], 0x01);
        assert_eq!(&raw[4..8], &[0x03, 0x02, 0x01, 0x00]);
        assert_eq!(&raw[12..16], &[1, 2, 3, 4]);
        assert_eq!(raw[18], 0x80);
        assert_eq!(&raw[20..22], &[0xef, 0xbe]);
        assert_eq!(raw[22], 0x42);
        assert!(raw[23..].iter().all(|&b| b == 0));
    }

    #[test]
    fn power_state_scaling() {
        let mut psd = PowerStateDescriptor { max_power: 550, ..Default::default() };
        assert!((psd.max_power_watts() - 5.5).abs() < 1e-9);
        psd.flags = 0x01;
        assert!((psd.max_power_watts() - 0.055).abs() < 1e-9);
        assert!(!psd.is_non_operational());
        psd.flags = 0x02;
        assert!(psd.is_non_operational());
    }

    #[test]
    fn power_state_count_is_clamped() {
        let mut buf = vec![0u8; 4096];
        buf[263] = 0xff;
        let id = IdentifyController::from_bytes(&buf).unwrap();
        assert_eq!(id.power_state_count(), 32);
        assert_eq!(id.reported_power_states().len(), 32);
    }
}
