use camino::{Utf8Path, Utf8PathBuf};
use dirs::home_dir;

pub const DEFAULT_WARPNET_HOME: &str = ".warpnet";

pub const DEFAULT_ECHO_PROTOCOL: &str = "/warpnet/echo/1.0.0";

pub const DEFAULT_LISTEN_ADDR: &str = "/ip4/0.0.0.0/tcp/4001";

pub fn default_home_dir() -> Utf8PathBuf {
    if let Some(home) = home_dir() {
        if let Some(home) = Utf8Path::from_path(&home) {
            return home.join(DEFAULT_WARPNET_HOME);
        }
    }

    Utf8PathBuf::from(DEFAULT_WARPNET_HOME)
}
