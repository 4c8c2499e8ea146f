pub mod profile01;
pub mod profile02;
pub mod profile04;
pub mod profile05;
pub mod profile11;
