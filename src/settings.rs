use encoding::EncodingRef;
use encoding::all::WINDOWS_1252;
use std::fmt;

/// Text written in place of a window-name ordinal that names no string resource.
pub const DEFAULT_INVALID_NAME_PLACEHOLDER: &str = "dialog error: invalid window name";

/// Name of the window class registered in place of the platform dialog class.
pub const DEFAULT_STAND_IN_CLASS_NAME: &str = "_____DIALOGCLASS_____";

/// Size of the buffer string resources are loaded into, terminator included.
pub const DEFAULT_MAX_STRING_RESOURCE_LEN: usize = 512;

/// Knobs for decoding, widening and creating dialogs.
#[derive(Clone)]
pub struct DialogSettings {
    /// Code page the narrow templates and string resources are written in.
    ansi_codec: EncodingRef,
    invalid_name_placeholder: String,
    stand_in_class_name: String,
    max_string_resource_len: usize,
    /// Shrink the widened buffer to the bytes actually written.
    trim_widened_buffer: bool,
}

impl fmt::Debug for DialogSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DialogSettings")
            .field("ansi_codec", &self.ansi_codec.name())
            .field("invalid_name_placeholder", &self.invalid_name_placeholder)
            .field("stand_in_class_name", &self.stand_in_class_name)
            .field("max_string_resource_len", &self.max_string_resource_len)
            .field("trim_widened_buffer", &self.trim_widened_buffer)
            .finish()
    }
}

impl PartialEq for DialogSettings {
    fn eq(&self, other: &Self) -> bool {
        self.ansi_codec.name() == other.ansi_codec.name()
            && self.invalid_name_placeholder == other.invalid_name_placeholder
            && self.stand_in_class_name == other.stand_in_class_name
            && self.max_string_resource_len == other.max_string_resource_len
            && self.trim_widened_buffer == other.trim_widened_buffer
    }
}

impl Default for DialogSettings {
    fn default() -> Self {
        DialogSettings {
            ansi_codec: WINDOWS_1252,
            invalid_name_placeholder: DEFAULT_INVALID_NAME_PLACEHOLDER.to_owned(),
            stand_in_class_name: DEFAULT_STAND_IN_CLASS_NAME.to_owned(),
            max_string_resource_len: DEFAULT_MAX_STRING_RESOURCE_LEN,
            trim_widened_buffer: false,
        }
    }
}

impl DialogSettings {
    pub fn new() -> Self {
        DialogSettings::default()
    }

    /// Sets the code page used to widen narrow text.
    pub fn ansi_codec(mut self, ansi_codec: EncodingRef) -> Self {
        self.ansi_codec = ansi_codec;
        self
    }

    pub fn invalid_name_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.invalid_name_placeholder = placeholder.into();
        self
    }

    pub fn stand_in_class_name(mut self, name: impl Into<String>) -> Self {
        self.stand_in_class_name = name.into();
        self
    }

    /// Sets the buffer size (terminator included) string resources are loaded into.
    /// Values below 1 are treated as 1.
    pub fn max_string_resource_len(mut self, len: usize) -> Self {
        self.max_string_resource_len = len.max(1);
        self
    }

    /// When set, widened templates are truncated to their written length instead of keeping the
    /// computed upper bound.
    pub fn trim_widened_buffer(mut self, trim: bool) -> Self {
        self.trim_widened_buffer = trim;
        self
    }

    pub fn get_ansi_codec(&self) -> EncodingRef {
        self.ansi_codec
    }

    pub fn get_invalid_name_placeholder(&self) -> &str {
        &self.invalid_name_placeholder
    }

    pub fn get_stand_in_class_name(&self) -> &str {
        &self.stand_in_class_name
    }

    pub fn get_max_string_resource_len(&self) -> usize {
        self.max_string_resource_len
    }

    pub fn should_trim_widened_buffer(&self) -> bool {
        self.trim_widened_buffer
    }
}
