//! # probekit-core
//!
//! Shared primitives for the probekit regression probes, plus the engine
//! behind the `cmp` toolbox binary.
//!
//! The probe binaries in `probekit-probes` are deliberately tiny; everything
//! with reusable behavior lives here:
//! - [`compare`]: byte-exact file comparison (the `cmp` engine)
//! - [`guard`]: fortify-style runtime bounds enforcement with fatal diagnostics
//! - [`tls`]: destructor-order bookkeeping for the TLS deallocation probes
//! - [`align`]: stack-alignment checks for `repr(align)` locals
//! - [`weak`]: optional (weak) symbol resolution through dynamic loading

#![deny(unsafe_code)]

pub mod align;
pub mod compare;
pub mod guard;
pub mod tls;
#[allow(unsafe_code)]
pub mod weak;
