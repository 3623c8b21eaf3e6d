//! Provide `FixedHasher`, based on `foldhash` with a fixed seed.

use core::hash::BuildHasher;

use foldhash::fast::{FixedState, FoldHasher};

/// The seed shared by every [`FixedHashState`].
const PARCEL_HASH_SEED: FixedState = FixedState::with_seed(0x7A3C_91E5_02BD_4F68);

/// A hasher whose results only depend on the input.
///
/// A type alias for [`foldhash::fast::FoldHasher`], created through
/// [`FixedHashState::build_hasher`].
pub type FixedHasher = FoldHasher<'static>;

/// Hash state with a fixed seed.
///
/// # Examples
///
/// ```
/// use core::hash::BuildHasher;
/// use parcel_utils::hash::FixedHashState;
///
/// let a = FixedHashState.hash_one("Ticket");
/// let b = FixedHashState.hash_one("Ticket");
/// assert_eq!(a, b);
/// ```
#[derive(Copy, Clone, Default, Debug)]
pub struct FixedHashState;

impl BuildHasher for FixedHashState {
    type Hasher = FixedHasher;

    #[inline(always)]
    fn build_hasher(&self) -> Self::Hasher {
        PARCEL_HASH_SEED.build_hasher()
    }
}
