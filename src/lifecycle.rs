//! Creation of native dialogs from 16-bit templates.

use std::sync::Arc;

use log::{debug, warn};

use crate::err::{DialogError, Result, WidenError};
use crate::host::{Environment, Hwnd, Menu16, Module, NarrowProc, ResourceId};
use crate::model::{ClassRef, DialogTemplate};
use crate::registry::{InitToken, InitWrapper, ProcRegistry};
use crate::relay::CallbackRelay;
use crate::settings::DialogSettings;
use crate::template::log_malformed;
use crate::thunk::ReleasedThunkLock;
use crate::utils::{ByteCursor, decode_ansi};
use crate::widen::{TemplateWidener, WidenedTemplate};

/// A template ready to be handed to the host.
struct PreparedDialog<'a> {
    widened: WidenedTemplate<'a>,
    token: InitToken,
}

/// Builds native dialogs out of 16-bit templates and routes their messages through a
/// [`CallbackRelay`].
pub struct DialogLifecycle<'e, E: Environment + ?Sized> {
    relay: CallbackRelay<'e, E>,
    settings: DialogSettings,
}

impl<'e, E: Environment + ?Sized> DialogLifecycle<'e, E> {
    pub fn new(env: &'e E, registry: Arc<ProcRegistry>, settings: DialogSettings) -> Self {
        DialogLifecycle {
            relay: CallbackRelay::new(env, registry),
            settings,
        }
    }

    pub fn relay(&self) -> &CallbackRelay<'e, E> {
        &self.relay
    }

    pub fn settings(&self) -> &DialogSettings {
        &self.settings
    }

    pub fn env(&self) -> &'e E {
        self.relay.env()
    }

    /// Runs a modal dialog and returns the code it was dismissed with.
    ///
    /// The owner's top-level window is disabled for the duration, and re-enabled afterwards
    /// only if it was enabled to begin with.
    pub fn create_modal(
        &self,
        module: Module,
        template: &[u8],
        owner: Option<Hwnd>,
        proc: Option<NarrowProc>,
        param: i32,
    ) -> Result<isize> {
        let env = self.env();
        let prepared = self.prepare(module, template, proc, param)?;

        let disabled_owner = owner
            .and_then(|owner| env.root_ancestor(owner))
            .filter(|&root| env.is_window_enabled(root));
        if let Some(root) = disabled_owner {
            env.enable_window(root, false);
        }

        let result = {
            let _unlocked = ReleasedThunkLock::new(env);
            env.dialog_box_indirect(
                module,
                prepared.widened.as_bytes(),
                owner,
                &self.relay,
                prepared.token.0,
            )
        };

        if let Some(root) = disabled_owner {
            env.enable_window(root, true);
        }

        match result {
            Some(code) => {
                self.discard_unclaimed(prepared.token);
                debug!("modal dialog ended with {code}");
                Ok(code)
            }
            None => {
                self.abandon(prepared.token);
                Err(DialogError::CreationFailed)
            }
        }
    }

    /// Creates a modeless dialog and returns its window.
    pub fn create_modeless(
        &self,
        module: Module,
        template: &[u8],
        owner: Option<Hwnd>,
        proc: Option<NarrowProc>,
        param: i32,
    ) -> Result<Hwnd> {
        let env = self.env();
        let prepared = self.prepare(module, template, proc, param)?;

        let hwnd = {
            let _unlocked = ReleasedThunkLock::new(env);
            env.create_dialog_indirect(
                module,
                prepared.widened.as_bytes(),
                owner,
                &self.relay,
                prepared.token.0,
            )
        };

        let Some(hwnd) = hwnd else {
            self.abandon(prepared.token);
            return Err(DialogError::CreationFailed);
        };

        self.discard_unclaimed(prepared.token);
        if let Some(proc) = proc {
            if self.relay.registry().proc_for(hwnd).is_none() {
                self.relay.set_dialog_proc(hwnd, proc);
            }
        }
        debug!("created modeless dialog {hwnd:?}");
        Ok(hwnd)
    }

    /// Decodes, loads the menu, widens and stages the init wrapper.
    fn prepare<'a>(
        &self,
        module: Module,
        template: &'a [u8],
        proc: Option<NarrowProc>,
        param: i32,
    ) -> Result<PreparedDialog<'a>> {
        let env = self.env();

        let mut cursor = ByteCursor::new(template);
        let header =
            DialogTemplate::read(&mut cursor).inspect_err(|e| log_malformed(template, e))?;

        let menu = self.load_menu(module, &header);

        let widened = TemplateWidener::new(env, &self.settings, module)
            .widen(&header, &mut cursor)
            .inspect_err(|e| {
                if let WidenError::Deserialization(inner) = e {
                    log_malformed(template, inner);
                }
            });
        let widened = match widened {
            Ok(widened) => widened,
            Err(e) => {
                if let Some(menu) = menu {
                    env.destroy_menu(menu);
                }
                return Err(e.into());
            }
        };

        let token = self.relay.registry().stage(InitWrapper {
            param,
            proc,
            menu,
            style: header.style,
        });

        Ok(PreparedDialog { widened, token })
    }

    /// The template's menu, or else the menu its window class declares.
    fn load_menu(&self, module: Module, header: &DialogTemplate<'_>) -> Option<Menu16> {
        let env = self.env();
        let codec = self.settings.get_ansi_codec();

        let name = ResourceId::from_menu_ref(header.menu, codec).or_else(|| match header.class {
            ClassRef::Named(class) => decode_ansi(class, codec, "dialog.class")
                .ok()
                .and_then(|class| env.class_menu(module, &class)),
            ClassRef::PlatformDefault => None,
        })?;

        let menu = env.load_menu(module, &name);
        if menu.is_none() {
            warn!("failed to load menu `{name}`");
        }
        menu
    }

    /// Cleans up after a failed creation.
    fn abandon(&self, token: InitToken) {
        self.discard_unclaimed(token);
        warn!("native dialog creation failed");
    }

    /// Drops a wrapper the dialog never claimed with `WM_INITDIALOG`, destroying its menu.
    /// A claimed wrapper's menu belongs to the window.
    fn discard_unclaimed(&self, token: InitToken) {
        let Some(wrapper) = self.relay.registry().take_staged(token) else {
            return;
        };
        debug!("init wrapper {token:?} was never claimed");
        if let Some(menu) = wrapper.menu {
            self.env().destroy_menu(menu);
        }
    }
}
