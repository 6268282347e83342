pub mod wasm_api;
