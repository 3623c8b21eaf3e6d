use alloc::borrow::Cow;

use crate::Host;

/// The sending side of a [`Payload`](crate::Payload).
///
/// Every payload records the origin it was created from, next to the target
/// host it is addressed at.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Context {
    origin: Cow<'static, str>,
}

impl Context {
    /// Create a context with an arbitrary origin name.
    #[inline]
    pub fn new(origin: impl Into<Cow<'static, str>>) -> Self {
        Self {
            origin: origin.into(),
        }
    }

    /// A context whose origin is the host type `H`.
    ///
    /// # Examples
    ///
    /// ```
    /// use parcel_payload::{Context, Host, Payload, derive::Host};
    ///
    /// #[derive(Host)]
    /// #[parcel(target = "screens.Main")]
    /// struct Main {
    ///     #[parcel(payload)]
    ///     payload: Option<Payload>,
    /// }
    ///
    /// assert_eq!(Context::of::<Main>().origin(), "screens.Main");
    /// ```
    #[inline]
    pub fn of<H: Host>() -> Self {
        Self::new(H::target())
    }

    #[inline]
    pub fn origin(&self) -> &str {
        &self.origin
    }
}
