/// [Szudzik's pairing function][szudzik-pairing]: maps a `u64` pair to a
/// single `u64`, injectively as long as the squares do not overflow.
///
/// The wrapping arithmetic keeps it total on the full range; a wrap-induced
/// collision only costs an extra structural equality check in the unique
/// table probing by this fingerprint.
///
/// [szudzik-pairing]: http://szudzik.com/ElegantPairing.pdf
pub fn pairing_szudzik(a: u64, b: u64) -> u64 {
    if a < b {
        b.wrapping_mul(b).wrapping_add(a)
    } else {
        a.wrapping_mul(a).wrapping_add(a).wrapping_add(b)
    }
}

/// Mixes two fingerprints into one (e.g. a node's `take` and `skip` child
/// hashes).
pub fn pairing2(a: u64, b: u64) -> u64 {
    pairing_szudzik(a, b)
}

/// Mixes three fingerprints into one (e.g. key hash, child mix, and count).
pub fn pairing3(a: u64, b: u64, c: u64) -> u64 {
    pairing2(pairing2(a, b), c)
}

/// A stable 64-bit structural fingerprint.
///
/// Both unique tables ([`WeakTable`]) hash their entries through this trait
/// rather than `std::hash::Hash`: nodes and homomorphisms precompute their
/// fingerprint at construction time, so lookups never re-walk the DAG.
///
/// ```
/// use std::rc::Rc;
/// use sfdd_rs::table::WeakTable;
///
/// // u64 fingerprints itself, so it can stand in for any interned value.
/// let mut table: WeakTable<u64> = WeakTable::new();
/// let canonical = table.insert(Rc::new(42)).1;
/// assert!(Rc::ptr_eq(&canonical, &table.insert(Rc::new(42)).1));
/// ```
///
/// [`WeakTable`]: crate::table::WeakTable
pub trait MyHash {
    fn hash(&self) -> u64;
}

impl MyHash for u64 {
    fn hash(&self) -> u64 {
        *self
    }
}

impl MyHash for (u64, u64) {
    fn hash(&self) -> u64 {
        pairing2(self.0, self.1)
    }
}
