//! Integration suite: full card pipeline against scripted providers.

mod mock_provider;
mod pipeline;
