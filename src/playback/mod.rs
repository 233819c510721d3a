pub mod clock;
pub mod control;
pub mod device;
pub mod scheduler;
pub mod seek;
pub mod session;
pub mod transport;

#[cfg(test)]
pub mod testing;
