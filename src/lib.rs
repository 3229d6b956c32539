//! # wftools
//!
//! Clients for genomics workflow engines: the Cromwell REST API, the GA4GH
//! Task Execution Service (TES) and the GA4GH Workflow Execution Service
//! (WES), plus collection of finished workflow outputs into a local
//! directory.
//!
//! All clients are blocking. Each operation sends one request and returns
//! the decoded result or an [`Error`].

pub mod cli_config;
pub mod collect;
pub mod cromwell;
pub mod error;
pub mod fs_utils;
pub mod models;
pub mod outputs;
pub mod submission;
pub mod tes;
pub mod transport;
pub mod wes;

pub use collect::{collect, CollectError, CollectMode, CollectOptions, CollectReport};
pub use cromwell::CromwellClient;
pub use error::{Error, Result};
pub use outputs::{TaskOutputs, WorkflowOutputs};
pub use submission::{is_url, Language, Submission, WorkflowSource};
pub use tes::TesClient;
pub use transport::{FormData, Transport, DEFAULT_API_VERSION};
pub use wes::WesClient;
