#![allow(unused_macros)]

/// Helper macro for locking items
///
/// A poisoned mutex is recovered instead of propagating the panic of another thread; the
/// guarded data in this crate (diagnostic writers) stays usable after a failed write.
///
/// ```rust, ignore
///  let mut out = lock!(self.writer);
///  writeln!(out, "{}", rendered)?;
/// ```
macro_rules! lock {
    ($lock:expr) => {
        $lock
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    };
}
