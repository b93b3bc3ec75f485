//! `RegisterHotKey` message loop on a dedicated thread.

use anyhow::{anyhow, Context, Result};
use std::sync::mpsc::{self, Sender};
use std::thread::JoinHandle;

use windows::Win32::Foundation::{HWND, LPARAM, WPARAM};
use windows::Win32::System::Threading::GetCurrentThreadId;
use windows::Win32::UI::Input::KeyboardAndMouse::{
    RegisterHotKey, UnregisterHotKey, HOT_KEY_MODIFIERS, MOD_NOREPEAT,
};
use windows::Win32::UI::WindowsAndMessaging::{
    GetMessageW, PostThreadMessageW, MSG, WM_HOTKEY, WM_QUIT,
};

use super::{Action, Hotkey};
use crate::log;
use crate::session::{BusyFlag, Event};

/// Running hotkey thread. Dropping it leaves the thread running; call
/// [`HotkeyListener::stop`] to unregister the keys.
pub struct HotkeyListener {
    thread_id: u32,
    handle: JoinHandle<()>,
}

impl HotkeyListener {
    /// Registers `bindings` and starts forwarding presses to `events`.
    ///
    /// A press is forwarded only if `busy` can be acquired; otherwise it is
    /// logged and dropped.
    pub fn spawn(
        bindings: Vec<(Hotkey, Action)>,
        busy: BusyFlag,
        events: Sender<Event>,
    ) -> Result<HotkeyListener> {
        let (ready_tx, ready_rx) = mpsc::channel();

        let handle = std::thread::Builder::new()
            .name("hotkeys".into())
            .spawn(move || {
                let thread_id = unsafe { GetCurrentThreadId() };
                let registered = register_all(&bindings);
                let _ = ready_tx.send((thread_id, registered.len()));
                if registered.is_empty() {
                    return;
                }

                message_loop(&bindings, &busy, &events);

                for id in registered {
                    unsafe {
                        let _ = UnregisterHotKey(HWND::default(), id);
                    }
                }
                log("Hotkey listener stopped.");
            })
            .context("Failed to spawn hotkey thread")?;

        let (thread_id, count) = ready_rx
            .recv()
            .context("Hotkey thread exited during startup")?;
        if count == 0 {
            return Err(anyhow!("No hotkey could be registered"));
        }
        log(&format!("{} hotkeys registered.", count));

        Ok(HotkeyListener { thread_id, handle })
    }

    /// Ends the message loop and waits for the thread.
    pub fn stop(self) {
        unsafe {
            let _ = PostThreadMessageW(self.thread_id, WM_QUIT, WPARAM(0), LPARAM(0));
        }
        let _ = self.handle.join();
    }
}

/// Registers each binding with its index as the hotkey id.
fn register_all(bindings: &[(Hotkey, Action)]) -> Vec<i32> {
    let mut registered = Vec::new();
    for (id, (hotkey, action)) in bindings.iter().enumerate() {
        let id = id as i32;
        let modifiers = HOT_KEY_MODIFIERS(hotkey.modifiers) | MOD_NOREPEAT;
        match unsafe { RegisterHotKey(HWND::default(), id, modifiers, hotkey.vk) } {
            Ok(()) => {
                log(&format!("  {:<16} -> {}", hotkey, action));
                registered.push(id);
            }
            Err(e) => log(&format!(
                "WARN: Could not register hotkey '{}' for {}: {}",
                hotkey, action, e
            )),
        }
    }
    registered
}

fn message_loop(bindings: &[(Hotkey, Action)], busy: &BusyFlag, events: &Sender<Event>) {
    let mut msg = MSG::default();
    loop {
        let ret = unsafe { GetMessageW(&mut msg, HWND::default(), 0, 0) };
        if ret.0 <= 0 {
            break;
        }
        if msg.message != WM_HOTKEY {
            continue;
        }

        let Some((hotkey, action)) = bindings.get(msg.wParam.0) else {
            continue;
        };

        let Some(guard) = busy.try_acquire() else {
            log(&format!(
                "Hotkey '{}' ({}) rejected: another action is still running.",
                hotkey, action
            ));
            continue;
        };

        if events.send(Event::Hotkey(*action, guard)).is_err() {
            break;
        }
    }
}
