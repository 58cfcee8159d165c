use bytemuck::{Pod, Zeroable};

use crate::{
    defined::{MOD_FRAME_SIZE, NUM_TRANS_IN_UNIT},
    gain::{Drive, GainProgram},
    modulation::{Chunk, Modulation},
};

/// The size of the frame header in bytes.
pub const HEADER_SIZE: usize = std::mem::size_of::<Header>();
/// The size of one device's drive table in bytes.
pub const BODY_SIZE_PER_DEVICE: usize = NUM_TRANS_IN_UNIT * std::mem::size_of::<Drive>();

bitflags::bitflags! {
    /// The control flags of a frame header.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ControlFlags: u8 {
        /// The frame carries the first chunk of a modulation cycle.
        const LOOP_BEGIN = 1 << 0;
        /// The frame carries the last chunk of a modulation cycle.
        const LOOP_END = 1 << 1;
        /// The firmware suppresses abrupt output transitions.
        const SILENT = 1 << 3;
        /// Reserved.
        const IS_SYNC_FIRST_SYNC0 = 1 << 5;
    }
}

/// The fixed-size header at the start of every frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct Header {
    msg_id: u8,
    control_flags: u8,
    command: u8,
    mod_size: u8,
    mod_data: [u8; MOD_FRAME_SIZE],
}

impl Header {
    /// Gets the message id.
    pub const fn msg_id(&self) -> u8 {
        self.msg_id
    }

    /// Gets the control flags. Unknown bits are retained.
    pub const fn control_flags(&self) -> ControlFlags {
        ControlFlags::from_bits_retain(self.control_flags)
    }

    /// Gets the command byte.
    pub const fn command(&self) -> u8 {
        self.command
    }

    /// Gets the modulation chunk carried by this frame.
    pub fn modulation(&self) -> &[u8] {
        &self.mod_data[..(self.mod_size as usize).min(MOD_FRAME_SIZE)]
    }
}

/// Assembles one frame.
///
/// The body holds the drive table of every device of the gain's geometry in id order, or nothing
/// if `gain` is `None`. If `modulation` is given, its next chunk is moved into the header and its
/// cursor advances.
///
/// # Panics
///
/// Panics if `gain` has not been built.
pub fn make_body(
    gain: Option<&GainProgram>,
    modulation: Option<&mut Modulation>,
    silent_mode: bool,
    msg_id: u8,
) -> Vec<u8> {
    encode(gain, modulation, silent_mode, msg_id).0
}

pub(crate) fn encode(
    gain: Option<&GainProgram>,
    modulation: Option<&mut Modulation>,
    silent_mode: bool,
    msg_id: u8,
) -> (Vec<u8>, Option<Chunk>) {
    let mut header = Header::zeroed();
    header.msg_id = msg_id;

    let mut flags = ControlFlags::empty();
    if silent_mode {
        flags |= ControlFlags::SILENT;
    }
    let chunk = modulation.map(|m| m.next_chunk(&mut header.mod_data));
    if let Some(chunk) = chunk {
        header.mod_size = chunk.len as _;
        flags.set(ControlFlags::LOOP_BEGIN, chunk.begin);
        flags.set(ControlFlags::LOOP_END, chunk.end);
    }
    header.control_flags = flags.bits();

    let Some(gain) = gain else {
        return (bytemuck::bytes_of(&header).to_vec(), chunk);
    };
    let (Some(geometry), Some(data)) = (gain.geometry(), gain.data()) else {
        panic!("gain must be built before framing");
    };
    let mut body = Vec::with_capacity(HEADER_SIZE + BODY_SIZE_PER_DEVICE * data.len());
    body.extend_from_slice(bytemuck::bytes_of(&header));
    geometry.iter().for_each(|dev| {
        body.extend_from_slice(bytemuck::cast_slice(&data[&dev.idx()]));
    });
    (body, chunk)
}

/// A read-only view of an encoded frame.
#[derive(Clone, Copy, Debug)]
pub struct Frame<'a> {
    header: &'a Header,
    body: &'a [Drive],
}

impl<'a> Frame<'a> {
    /// Interprets `bytes` as a frame.
    ///
    /// Returns `None` if `bytes` is shorter than a header or the body is not a whole number of
    /// device tables.
    pub fn parse(bytes: &'a [u8]) -> Option<Self> {
        if bytes.len() < HEADER_SIZE || (bytes.len() - HEADER_SIZE) % BODY_SIZE_PER_DEVICE != 0 {
            return None;
        }
        let (header, body) = bytes.split_at(HEADER_SIZE);
        Some(Self {
            header: bytemuck::from_bytes(header),
            body: bytemuck::cast_slice(body),
        })
    }

    /// Gets the header.
    pub const fn header(&self) -> &'a Header {
        self.header
    }

    /// Gets the number of device tables in the body.
    pub fn num_devices(&self) -> usize {
        self.body.len() / NUM_TRANS_IN_UNIT
    }

    /// Gets the drive table at position `idx` in the body.
    pub fn drives(&self, idx: usize) -> &'a [Drive] {
        &self.body[idx * NUM_TRANS_IN_UNIT..(idx + 1) * NUM_TRANS_IN_UNIT]
    }
}
