use anyhow::{Context, Result, bail};
use clap::{Arg, ArgAction, ArgMatches, Command};
use encoding::all::encodings;
use encoding::{EncoderTrap, Encoding, EncodingRef};
use hashbrown::HashMap;
use log::LevelFilter;
use serde::Serialize;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use dlg16::host::{Atom, ClassRegistry, Hwnd, Module, NarrowProc, ResourceId, StringResources};
use dlg16::{
    BuiltinClass, ClassMode, ClassName, ClassRef, ControlInfo, DecodedDialog, DialogSettings,
    MenuRef, TemplateWidener, WindowName, hexdump,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Json,
    Jsonl,
}

/// Stands in for a running system: string resources come from a JSON file, class names are
/// passed through and registrations always succeed.
#[derive(Debug, Default)]
struct OfflineHost {
    strings: HashMap<u16, Vec<u8>>,
}

impl ClassRegistry for OfflineHost {
    fn ensure_stand_in_class(&self, _module: Module, _class_name: &str) -> bool {
        true
    }

    fn native_class_name(&self, _module: Module, class_name: &str) -> String {
        class_name.to_owned()
    }

    fn class_atom(&self, _hwnd: Hwnd) -> Option<Atom> {
        None
    }

    fn class_default_proc(&self, _atom: Atom) -> Option<NarrowProc> {
        None
    }

    fn class_menu(&self, _module: Module, _class_name: &str) -> Option<ResourceId> {
        None
    }
}

impl StringResources for OfflineHost {
    fn load_string(&self, _module: Module, id: u16, max_len: usize) -> Option<Vec<u8>> {
        self.strings.get(&id).map(|s| {
            let mut s = s.clone();
            s.truncate(max_len.saturating_sub(1));
            s
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum NameJson {
    Text(String),
    Ordinal(u16),
}

#[derive(Debug, Serialize)]
struct FontJson {
    point_size: u16,
    face_name: String,
}

#[derive(Debug, Serialize)]
struct ControlJson {
    id: u16,
    style: String,
    x: i16,
    y: i16,
    cx: i16,
    cy: i16,
    class: String,
    window_name: NameJson,
    #[serde(skip_serializing_if = "Option::is_none")]
    creation_data: Option<String>,
}

#[derive(Debug, Serialize)]
struct DialogJson {
    source: String,
    style: String,
    item_count: u8,
    x: i16,
    y: i16,
    cx: i16,
    cy: i16,
    menu: Option<NameJson>,
    class: Option<String>,
    caption: String,
    font: Option<FontJson>,
    controls: Vec<ControlJson>,
    size: usize,
}

struct Dlg16Dump {
    inputs: Vec<PathBuf>,
    format: OutputFormat,
    widen: bool,
    class_mode: ClassMode,
    settings: DialogSettings,
    host: OfflineHost,
    verbosity_level: Option<LevelFilter>,
}

impl Dlg16Dump {
    fn from_cli_matches(matches: &ArgMatches) -> Result<Self> {
        let inputs: Vec<PathBuf> = matches
            .get_many::<String>("INPUT")
            .map(|values| values.map(PathBuf::from).collect())
            .unwrap_or_default();

        let format = match matches.get_one::<String>("format").map(String::as_str) {
            Some("jsonl") => OutputFormat::Jsonl,
            _ => OutputFormat::Json,
        };

        let codec_name = matches
            .get_one::<String>("ansi-codec")
            .map(String::as_str)
            .unwrap_or("windows-1252");
        let Some(ansi_codec) = encodings().iter().find(|c| c.name() == codec_name) else {
            bail!("unknown ansi codec `{codec_name}`");
        };
        let ansi_codec: EncodingRef = *ansi_codec;

        let mut settings = DialogSettings::new()
            .ansi_codec(ansi_codec)
            .trim_widened_buffer(matches.get_flag("trim"));
        if let Some(placeholder) = matches.get_one::<String>("placeholder") {
            settings = settings.invalid_name_placeholder(placeholder.clone());
        }

        let host = match matches.get_one::<String>("strings") {
            Some(path) => Self::load_strings(Path::new(path), ansi_codec)?,
            None => OfflineHost::default(),
        };

        let class_mode = if matches.get_flag("platform-class") {
            ClassMode::PlatformDefault
        } else {
            ClassMode::StandIn
        };

        let verbosity_level = match matches.get_count("verbose") {
            0 => None,
            1 => Some(LevelFilter::Info),
            2 => Some(LevelFilter::Debug),
            _ => Some(LevelFilter::Trace),
        };

        Ok(Dlg16Dump {
            inputs,
            format,
            widen: matches.get_flag("widen"),
            class_mode,
            settings,
            host,
            verbosity_level,
        })
    }

    /// Reads `{"<id>": "<text>", ...}` and encodes each text with the narrow codec.
    fn load_strings(path: &Path, codec: EncodingRef) -> Result<OfflineHost> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read string table `{}`", path.display()))?;
        let table: BTreeMap<String, String> = serde_json::from_str(&raw)
            .with_context(|| format!("`{}` is not a JSON object of strings", path.display()))?;

        let mut strings = HashMap::with_capacity(table.len());
        for (id, text) in table {
            let id: u16 = id
                .parse()
                .with_context(|| format!("string id `{id}` is not a 16-bit number"))?;
            let bytes = codec
                .encode(&text, EncoderTrap::Replace)
                .map_err(|e| anyhow::anyhow!("failed to encode string {id}: {e}"))?;
            strings.insert(id, bytes);
        }
        Ok(OfflineHost { strings })
    }

    fn run(&self) -> Result<()> {
        self.try_to_initialize_logging();

        let stdout = io::stdout();
        let mut out = stdout.lock();
        for input in &self.inputs {
            let data = fs::read(input)
                .with_context(|| format!("failed to read `{}`", input.display()))?;
            self.dump_one(&mut out, &input.display().to_string(), &data)?;
        }
        Ok(())
    }

    fn dump_one(&self, out: &mut impl Write, source: &str, data: &[u8]) -> Result<()> {
        let decoded = DecodedDialog::parse(data)
            .with_context(|| format!("failed to decode dialog template `{source}`"))?;
        let json = self.to_json(source, &decoded);

        match self.format {
            OutputFormat::Json => serde_json::to_writer_pretty(&mut *out, &json)?,
            OutputFormat::Jsonl => serde_json::to_writer(&mut *out, &json)?,
        }
        writeln!(out)?;

        if self.widen {
            let widened = TemplateWidener::new(&self.host, &self.settings, Module(0))
                .with_class_mode(self.class_mode)
                .widen_bytes(data)
                .with_context(|| format!("failed to widen dialog template `{source}`"))?;
            writeln!(
                out,
                "widened: {} bytes written, {} allocated, items at {:?}",
                widened.written_len(),
                widened.len(),
                widened.item_offsets()
            )?;
            write!(out, "{}", hexdump(widened.as_bytes(), 0))?;
        }
        Ok(())
    }

    fn to_json(&self, source: &str, decoded: &DecodedDialog<'_>) -> DialogJson {
        let codec = self.settings.get_ansi_codec();
        let template = &decoded.template;

        DialogJson {
            source: source.to_owned(),
            style: format!("0x{:08x}", template.style.bits()),
            item_count: template.item_count,
            x: template.x,
            y: template.y,
            cx: template.cx,
            cy: template.cy,
            menu: match template.menu {
                MenuRef::None => None,
                MenuRef::Ordinal(id) => Some(NameJson::Ordinal(id)),
                MenuRef::Named(name) => Some(NameJson::Text(name.to_string_lossy(codec))),
            },
            class: match template.class {
                ClassRef::PlatformDefault => None,
                ClassRef::Named(name) => Some(name.to_string_lossy(codec)),
            },
            caption: template.caption.to_string_lossy(codec),
            font: template.font.map(|font| FontJson {
                point_size: font.point_size,
                face_name: font.face_name.to_string_lossy(codec),
            }),
            controls: decoded
                .controls
                .iter()
                .map(|control| Self::control_json(control, codec))
                .collect(),
            size: decoded.consumed,
        }
    }

    fn control_json(control: &ControlInfo<'_>, codec: EncodingRef) -> ControlJson {
        ControlJson {
            id: control.id,
            style: format!("0x{:08x}", control.style),
            x: control.x,
            y: control.y,
            cx: control.cx,
            cy: control.cy,
            class: match control.class_name {
                ClassName::Builtin(BuiltinClass::Unknown(tag)) => format!("#{tag:#04x}"),
                ClassName::Builtin(builtin) => builtin.name().to_owned(),
                ClassName::Named(name) => name.to_string_lossy(codec),
            },
            window_name: match control.window_name {
                WindowName::Text(text) => NameJson::Text(text.to_string_lossy(codec)),
                WindowName::Ordinal(id) => NameJson::Ordinal(id),
            },
            creation_data: control
                .creation_data
                .map(|data| data.iter().map(|b| format!("{b:02x}")).collect()),
        }
    }

    fn try_to_initialize_logging(&self) {
        if let Some(level) = self.verbosity_level {
            if let Err(e) = TermLogger::init(
                level,
                Config::default(),
                TerminalMode::Stderr,
                ColorChoice::Auto,
            ) {
                eprintln!("Failed to initialize logging: {e}");
            }
        }
    }
}

fn command() -> Command {
    Command::new("dlg16_dump")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Decode 16-bit dialog templates and show their widened native form")
        .arg(
            Arg::new("INPUT")
                .required(true)
                .action(ArgAction::Append)
                .value_name("PATH")
                .help("Raw dialog template resource. Can be passed multiple times."),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .short('o')
                .value_parser(["json", "jsonl"])
                .default_value("json")
                .help("Sets the output format of the decoded template"),
        )
        .arg(
            Arg::new("widen")
                .long("widen")
                .short('w')
                .action(ArgAction::SetTrue)
                .help("Also widen the template and print a hexdump of the native layout."),
        )
        .arg(
            Arg::new("platform-class")
                .long("platform-class")
                .action(ArgAction::SetTrue)
                .help("Widen templates without a class to the platform dialog class instead of the stand-in class."),
        )
        .arg(
            Arg::new("trim")
                .long("trim")
                .action(ArgAction::SetTrue)
                .help("Trim the widened buffer to the bytes actually written."),
        )
        .arg(
            Arg::new("strings")
                .long("strings")
                .value_name("PATH")
                .help("JSON object mapping string resource ids to text, used for ordinal window names."),
        )
        .arg(
            Arg::new("placeholder")
                .long("placeholder")
                .value_name("TEXT")
                .help("Text used for ordinal window names that name no string resource."),
        )
        .arg(
            Arg::new("ansi-codec")
                .long("ansi-codec")
                .value_parser(
                    encodings()
                        .iter()
                        .filter(|&e| e.raw_decoder().is_ascii_compatible())
                        .map(|e| e.name())
                        .collect::<Vec<&'static str>>(),
                )
                .default_value(encoding::all::WINDOWS_1252.name())
                .help("Code page the templates and string resources are written in."),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .action(ArgAction::Count)
                .help("-v - info, -vv - debug, -vvv - trace."),
        )
}

fn main() -> Result<()> {
    let matches = command().get_matches();
    Dlg16Dump::from_cli_matches(&matches)?.run()
}
