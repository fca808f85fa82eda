mod compress_dirs;
mod compress_files;
mod compress_psx;
mod extract;
mod extract_psx;
mod fix_cue;
mod transcode;

#[cfg(test)]
mod test_support;

pub use compress_dirs::run_compress_dirs;
pub use compress_files::run_compress_files;
pub use compress_psx::run_compress_psx;
pub use extract::run_extract;
pub use extract_psx::run_extract_psx;
pub use fix_cue::run_fix_cue;
pub use transcode::run_transcode;

use indicatif::{ProgressBar, ProgressStyle};

use crate::error_handling::CliError;

/// Builds the per-item progress bar of a batch, or `None` in quiet mode.
pub(crate) fn item_progress(
    len: usize,
    quiet: bool,
    message: &'static str,
) -> Result<Option<ProgressBar>, CliError> {
    if quiet {
        return Ok(None);
    }

    let bar = ProgressBar::new(len as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {pos}/{len} {msg}\n[{bar:40}]")?
            .progress_chars("#>-"),
    );
    bar.set_message(message);
    Ok(Some(bar))
}
