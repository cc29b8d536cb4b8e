pub mod sample_loader;
