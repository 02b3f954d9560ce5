//! `<script>` tags for pages that load modules one by one

use scriptcat_vfs::VirtualFileSystem;
use std::fmt::Write as _;
use std::path::Path;
use std::time::UNIX_EPOCH;

use crate::error::{Result, ScriptError};
use crate::node::Script;
use crate::render::Renderer;
use crate::template::TemplateVars;

/// Hex string derived from the file's modification time, for `?` query suffixes.
///
/// Stable while the file is untouched; changes whenever it is rewritten.
pub fn cache_breaker(fs: &dyn VirtualFileSystem, path: &Path) -> Result<String> {
    let modified = fs.modified(path)?;
    let seconds = match modified.duration_since(UNIX_EPOCH) {
        Ok(after) => after.as_secs_f64(),
        Err(before) => -before.duration().as_secs_f64(),
    };
    let mut hex = String::with_capacity(16);
    for byte in seconds.to_le_bytes() {
        let _ = write!(hex, "{:02x}", byte);
    }
    Ok(hex)
}

fn check_mount(mount: &str) -> Result<()> {
    let reason = if mount.is_empty() {
        Some("empty")
    } else if !mount.ends_with('/') {
        Some("must end with '/'")
    } else if mount
        .chars()
        .any(|c| c.is_whitespace() || c.is_control() || "\"'<>?#".contains(c))
    {
        Some("contains a character that cannot appear in a src attribute")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(ScriptError::InvalidMountPoint {
            mount: mount.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

impl Renderer {
    /// `<script>` element carrying the header and rendered content inline
    pub fn script_tag_inline(&self, script: &Script, dictionary: &TemplateVars) -> Result<String> {
        Ok(format!(
            "<script>{};\n{}</script>",
            self.declaration_header(script)?,
            self.render_content(script, dictionary)?
        ))
    }

    /// Header `<script>` followed by a `<script src>` pointing at the module
    /// file under `mount`, the URL prefix where the base directory is served.
    pub fn script_tag_src(&self, script: &Script, mount: &str) -> Result<String> {
        check_mount(mount)?;
        let (Some(relative), Some(absolute)) = (script.filename()?, script.absolute_filename()?)
        else {
            return Err(ScriptError::InvalidMountPoint {
                mount: mount.to_string(),
                reason: "virtual scripts have no file to link",
            });
        };
        let url_path = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        let breaker = cache_breaker(script.env().fs(), &absolute)?;
        Ok(format!(
            "<script>{}</script><script src=\"{}{}?{}\"></script>\n",
            self.declaration_header(script)?,
            mount,
            url_path,
            breaker
        ))
    }
}
