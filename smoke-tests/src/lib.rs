//! End-to-end checks of the zkinfer toolchain.
#[cfg(test)]
mod tests;
