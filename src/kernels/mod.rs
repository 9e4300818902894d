//! Pure, stateless kernels operating on caller pixel arrays before they cross
//! the native boundary.

pub mod layout;
