pub mod dates;
pub mod fixture_acquisition;
pub mod insights;
pub mod json_extract;
pub mod prompts;
pub mod response_parsing;
