pub mod cli;
pub mod constants;
pub mod error;
pub mod estimate;
pub mod metadata;
pub mod optimize;
pub mod scan;
pub mod turbo;
pub mod upload;

pub use error::{PipelineError, Result};
pub use estimate::{credit_delta, estimate_command, estimate_costs, EstimateConfig};
pub use metadata::{build_url_map, update_metadata, MetadataConfig, ReconcileSummary};
pub use optimize::{optimize_directory, optimize_image, OptimizeConfig};
pub use scan::{base_name, image_files_in, is_image_file, savings_percent, total_size};
pub use turbo::{
    build_manifest_json, winc_to_credits, ConsoleEvents, CostQuote, FolderUploadRequest,
    FolderUploadResult, JwkWallet, ManifestPath, StorageService, Tag, TurboClient, UploadEvents,
    UploadPhase,
};
pub use upload::{
    error_hints, resolve_input_dir, sanitize_timestamp, upload_command, upload_folder_flow,
    UploadConfig, UploadResults, UploadedFile,
};
