use std::fmt;

macro_rules! define_errors {
    (
        $(wrap $variant:ident($ty:ty) => $label:expr),*;
        $(msg $msg_variant:ident => $msg_label:expr),*
        $(;)?
    ) => {
        #[derive(Debug)]
        pub enum MgdlError {
            $($variant($ty),)*
            $($msg_variant(String),)*
        }

        impl fmt::Display for MgdlError {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self {
                    $(MgdlError::$variant(err) => write!(f, "{}: {}", $label, err),)*
                    $(MgdlError::$msg_variant(msg) => write!(f, "{}: {}", $msg_label, msg),)*
                }
            }
        }

        $(impl From<$ty> for MgdlError {
            fn from(err: $ty) -> Self {
                MgdlError::$variant(err)
            }
        })*
    };
}

define_errors! {
    wrap Io(std::io::Error)              => "Io error",
    wrap Toml(toml::de::Error)           => "Toml error",
    wrap Http(reqwest::Error)            => "Remote error",
    wrap Zip(zip::result::ZipError)      => "Archive error",
    wrap Walk(walkdir::Error)            => "Io error";
    msg Config   => "Config error",
    msg Remote   => "Remote error",
    msg Data     => "Data error",
    msg NotFound => "Not found",
    msg Archive  => "Archive error",
    msg Logger   => "Logger error"
}

impl std::error::Error for MgdlError {}

pub type MgdlResult<T> = std::result::Result<T, MgdlError>;
