//! Hardware Dispatcher
//!
//! Selects the fastest available kernel (AES-NI or portable) for the current CPU.

#[cfg(target_arch = "x86_64")]
use crate::kernels::aesni::AesNi;
use crate::kernels::portable::Portable;
use crate::kernels::Kernel;
use crate::types::{Backend, SetupError};

// =============================================================================
// KERNEL CHOICE
// =============================================================================

/// A resolved backend. Holding the `AesNi` variant proves the CPU supports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelChoice {
    /// Pure Rust kernel.
    Portable(Portable),
    /// AES-NI + PCLMULQDQ kernel.
    #[cfg(target_arch = "x86_64")]
    AesNi(AesNi),
}

impl KernelChoice {
    /// The backend behind this choice.
    #[must_use]
    pub fn backend(self) -> Backend {
        match self {
            Self::Portable(k) => k.backend(),
            #[cfg(target_arch = "x86_64")]
            Self::AesNi(k) => k.backend(),
        }
    }
}

/// Run `$body` with `$k` bound to the concrete kernel inside a `KernelChoice`.
///
/// The body is monomorphized once per backend, so the inner loops never pay
/// for dynamic dispatch.
macro_rules! with_kernel {
    ($choice:expr, $k:ident => $body:expr) => {
        match $choice {
            $crate::engine::dispatcher::KernelChoice::Portable($k) => $body,
            #[cfg(target_arch = "x86_64")]
            $crate::engine::dispatcher::KernelChoice::AesNi($k) => $body,
        }
    };
}
pub(crate) use with_kernel;

// =============================================================================
// DISPATCHER
// =============================================================================

#[cfg(target_arch = "x86_64")]
fn aesni_kernel() -> Option<KernelChoice> {
    AesNi::detect().map(KernelChoice::AesNi)
}

#[cfg(not(target_arch = "x86_64"))]
const fn aesni_kernel() -> Option<KernelChoice> {
    None
}

/// Returns the fastest kernel for this CPU.
#[must_use]
pub fn best_backend() -> KernelChoice {
    aesni_kernel().unwrap_or(KernelChoice::Portable(Portable))
}

/// Resolve a requested backend (`None` = automatic).
///
/// # Errors
/// `SetupError::CpuFeature` when AES-NI is requested but unavailable.
pub fn select(requested: Option<Backend>) -> Result<KernelChoice, SetupError> {
    let choice = match requested {
        None => best_backend(),
        Some(Backend::Portable) => KernelChoice::Portable(Portable),
        Some(Backend::AesNi) => aesni_kernel().ok_or(SetupError::CpuFeature("aes+pclmulqdq"))?,
    };
    tracing::debug!(
        backend = choice.backend().name(),
        forced = requested.is_some(),
        "resolved GCM backend"
    );
    Ok(choice)
}

/// Returns the name of the active hardware backend.
#[must_use]
pub fn get_active_backend_name() -> &'static str {
    best_backend().backend().name()
}
