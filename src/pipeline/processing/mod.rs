// Pipeline processing: validation, correction, diagnostics and reporting

pub mod aggregate;
pub mod diagnostics;
pub mod normalize;
pub mod overrides;
