//! Structure export in the fixed-column atom-record format the assembly
//! engine reads back.

pub mod pdb;
