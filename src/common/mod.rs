pub(crate) mod counter;
pub(crate) mod crc;
pub(crate) mod frame;
