//! Byte-wide port I/O registry.
//!
//! Devices install read or write handlers over contiguous port ranges and get
//! back a [`HandlerId`] used to uninstall them. Reads nobody answers float
//! high (`0xff`); unclaimed writes are dropped.

use crate::ports::UNMAPPED_READ_VALUE;

pub type ReadHandler = Box<dyn FnMut(u16) -> u8>;
pub type WriteHandler = Box<dyn FnMut(u16, u8)>;

/// Identifies an installed handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

struct RangeHandler<H> {
    id: HandlerId,
    start: u16,
    len: u16,
    handler: H,
}

impl<H> RangeHandler<H> {
    fn end_exclusive(&self) -> u32 {
        u32::from(self.start) + u32::from(self.len)
    }

    fn contains(&self, port: u16) -> bool {
        let p = u32::from(port);
        p >= u32::from(self.start) && p < self.end_exclusive()
    }
}

/// Sorted, non-overlapping ranges for one access direction.
struct RangeMap<H> {
    ranges: Vec<RangeHandler<H>>,
}

impl<H> RangeMap<H> {
    const fn new() -> Self {
        Self { ranges: Vec::new() }
    }

    fn insert(&mut self, id: HandlerId, start: u16, len: u16, handler: H) {
        assert!(len != 0, "I/O port range length must be non-zero");
        let end_exclusive = u32::from(start) + u32::from(len);
        assert!(
            end_exclusive <= 0x1_0000,
            "I/O port range wraps past 0xFFFF: start={start:#x} len={len:#x}"
        );

        let idx = self.ranges.partition_point(|r| r.start < start);
        if let Some(prev) = idx.checked_sub(1).and_then(|i| self.ranges.get(i)) {
            assert!(
                u32::from(start) >= prev.end_exclusive(),
                "overlapping I/O port ranges: new=[{start:#x}..{end_exclusive:#x}) prev=[{:#x}..{:#x})",
                prev.start,
                prev.end_exclusive()
            );
        }
        if let Some(next) = self.ranges.get(idx) {
            assert!(
                end_exclusive <= u32::from(next.start),
                "overlapping I/O port ranges: new=[{start:#x}..{end_exclusive:#x}) next=[{:#x}..{:#x})",
                next.start,
                next.end_exclusive()
            );
        }

        self.ranges.insert(
            idx,
            RangeHandler {
                id,
                start,
                len,
                handler,
            },
        );
    }

    fn remove(&mut self, id: HandlerId) -> bool {
        let before = self.ranges.len();
        self.ranges.retain(|r| r.id != id);
        self.ranges.len() != before
    }

    fn find_mut(&mut self, port: u16) -> Option<&mut RangeHandler<H>> {
        let idx = self.ranges.partition_point(|r| r.start <= port);
        let cand = idx.checked_sub(1)?;
        self.ranges.get_mut(cand).filter(|r| r.contains(port))
    }

    fn is_mapped(&self, port: u16) -> bool {
        self.ranges.iter().any(|r| r.contains(port))
    }
}

/// Port I/O bus shared by the emulated devices.
pub struct IoBus {
    reads: RangeMap<ReadHandler>,
    writes: RangeMap<WriteHandler>,
    next_id: u64,
}

impl core::fmt::Debug for IoBus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("IoBus")
            .field("read_ranges", &self.reads.ranges.len())
            .field("write_ranges", &self.writes.ranges.len())
            .finish()
    }
}

impl Default for IoBus {
    fn default() -> Self {
        Self::new()
    }
}

impl IoBus {
    pub const fn new() -> Self {
        Self {
            reads: RangeMap::new(),
            writes: RangeMap::new(),
            next_id: 0,
        }
    }

    fn allocate_id(&mut self) -> HandlerId {
        let id = HandlerId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Installs a read handler answering `len` ports from `start`.
    ///
    /// # Panics
    ///
    /// Panics if the range is empty, wraps past `0xFFFF`, or overlaps another
    /// read handler.
    pub fn install_read(&mut self, start: u16, len: u16, handler: ReadHandler) -> HandlerId {
        let id = self.allocate_id();
        self.reads.insert(id, start, len, handler);
        id
    }

    /// Installs a write handler covering `len` ports from `start`.
    ///
    /// # Panics
    ///
    /// Same conditions as [`Self::install_read`], against write handlers.
    pub fn install_write(&mut self, start: u16, len: u16, handler: WriteHandler) -> HandlerId {
        let id = self.allocate_id();
        self.writes.insert(id, start, len, handler);
        id
    }

    /// Removes a handler. Returns `false` if it was not installed.
    pub fn uninstall(&mut self, id: HandlerId) -> bool {
        self.reads.remove(id) || self.writes.remove(id)
    }

    pub fn read(&mut self, port: u16) -> u8 {
        match self.reads.find_mut(port) {
            Some(range) => (range.handler)(port),
            None => UNMAPPED_READ_VALUE,
        }
    }

    pub fn write(&mut self, port: u16, value: u8) {
        if let Some(range) = self.writes.find_mut(port) {
            (range.handler)(port, value);
        }
    }

    pub fn is_read_mapped(&self, port: u16) -> bool {
        self.reads.is_mapped(port)
    }

    pub fn is_write_mapped(&self, port: u16) -> bool {
        self.writes.is_mapped(port)
    }
}
