//! Names and flags shared with the ISiS command line.
//!
//! Flags are documented at
//! <https://isis-documentation.readthedocs.io/en/latest/CmdLineArgs.html>.

/// Default ISiS executable. The bundled installer puts `isis.sh` on the PATH.
pub const ISIS_PATH: &str = "isis.sh";

/// Keeps ISiS from printing anything while rendering
pub const SILENT_FLAG: &str = "--quiet";

pub const SECTION_LYRIC_NAME: &str = "lyrics";

pub const SECTION_SCORE_NAME: &str = "score";

/// Extension appended to the output path to name the intermediate score file
pub const SCORE_FILE_SUFFIX: &str = "isis_score";
