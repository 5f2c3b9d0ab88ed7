//! Integration tests for the ScriptHub service layer.


mod analysis_test;
mod structure_test;
