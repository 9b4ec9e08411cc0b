//! The 32-bit correlation handle space.
//!
//! Client-originated request handles always have the top bit set; the
//! server numbers its spontaneous callbacks from its own low-valued
//! counter. The partition keeps the two numbering spaces from colliding,
//! so classification of an inbound frame is a single bit test.

/// A u32 with only the top bit set. Seed of the request handle counter and
/// mask for classifying inbound frames.
pub const REQUEST_HANDLE_BASE: u32 = 0x8000_0000;

/// Whether an inbound frame handle identifies a server-initiated callback.
pub fn is_server_callback(handle: u32) -> bool {
    handle & REQUEST_HANDLE_BASE == 0
}

/// Whether an inbound frame handle correlates to a client request.
pub fn is_request(handle: u32) -> bool {
    !is_server_callback(handle)
}

/// Allocates request handles: strictly increasing from the base, wrapping
/// within the top-bit-set space so an allocated handle never leaks into
/// the server-callback space.
#[derive(Debug)]
pub struct HandleAllocator {
    next: u32,
}

impl HandleAllocator {
    pub fn new() -> Self {
        Self {
            next: REQUEST_HANDLE_BASE,
        }
    }

    /// Allocate the next request handle.
    pub fn allocate(&mut self) -> u32 {
        self.next = self.next.wrapping_add(1) | REQUEST_HANDLE_BASE;
        self.next
    }
}

impl Default for HandleAllocator {
    fn default() -> Self {
        Self::new()
    }
}
