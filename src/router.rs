//! Address-range routing
//!
//! Maps a 64-bit address to the resolver owning the range it falls in.
//! Bindings are registered once at startup and never removed; registration
//! rejects overlapping ranges instead of silently resolving them by scan
//! order. Point lookup is a first-match linear scan in registration order,
//! memoized per address.

use std::collections::HashMap;

use log::info;

use crate::errors::TableError;
use crate::resolver::SymbolResolver;

/// Kernel text mapping on x86_64.
/// See <https://www.kernel.org/doc/html/v6.6/arch/x86/x86_64/mm.html>
pub const KERNEL_RANGE: AddressRange =
    AddressRange { start: 0xffff_ffff_8000_0000, end: 0xffff_ffff_a000_0000 };

/// Half-open range of 64-bit addresses attributed to one binary image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressRange {
    pub start: u64,
    pub end: u64,
}

impl AddressRange {
    /// Check if an address falls within this range
    #[must_use]
    pub fn contains(&self, addr: u64) -> bool {
        addr >= self.start && addr < self.end
    }

    /// Check if two half-open ranges share any address
    #[must_use]
    pub fn overlaps(&self, other: &AddressRange) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// One range-to-resolver binding. Lives for the process lifetime.
struct Binding {
    range: AddressRange,
    label: String,
    resolver: SymbolResolver,
}

/// Ordered collection of range-resolver bindings.
///
/// Registration order matters: the first range containing an address wins
/// the linear scan. The kernel range (when configured) is registered first,
/// then module ranges in module-table order.
#[derive(Default)]
pub struct ResolverTable {
    bindings: Vec<Binding>,
    // Point-lookup memo. Only successful lookups are cached; a miss
    // re-scans on every occurrence.
    memo: HashMap<u64, usize>,
}

impl ResolverTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a binding for `range`.
    ///
    /// # Errors
    /// Fails if `range` overlaps an already-registered range (an exact
    /// duplicate included).
    pub fn register(
        &mut self,
        range: AddressRange,
        label: String,
        resolver: SymbolResolver,
    ) -> Result<(), TableError> {
        if let Some(prev) = self.bindings.iter().find(|b| b.range.overlaps(&range)) {
            return Err(TableError::OverlappingRange {
                start: range.start,
                end: range.end,
                label,
                prev_start: prev.range.start,
                prev_end: prev.range.end,
                prev_label: prev.label.clone(),
            });
        }

        info!("registered {}: 0x{:016x}-0x{:016x}", label, range.start, range.end);
        self.bindings.push(Binding { range, label, resolver });
        Ok(())
    }

    /// Find the resolver whose range contains `addr`, if any.
    ///
    /// First match in registration order. Hits are memoized so repeated
    /// addresses skip the scan; misses are not cached.
    pub fn lookup(&mut self, addr: u64) -> Option<&mut SymbolResolver> {
        if let Some(&idx) = self.memo.get(&addr) {
            return Some(&mut self.bindings[idx].resolver);
        }

        let idx = self.bindings.iter().position(|b| b.range.contains(addr))?;
        self.memo.insert(addr, idx);
        Some(&mut self.bindings[idx].resolver)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
