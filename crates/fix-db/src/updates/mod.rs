//! Input types for ticket mutations: creation payload and partial-update builder.

pub mod ticket;
