//! Integration tests for the DormDesk chat engine.

mod chat_test;
mod helpers;
