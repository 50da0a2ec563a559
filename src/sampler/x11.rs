use anyhow::{Result, anyhow};
use tracing::instrument;
use xcb::{
    Connection, Xid,
    screensaver::{QueryInfo, QueryInfoReply},
    x::{ATOM_ANY, Atom, Drawable, GetProperty, InternAtom, Window},
};

use super::ActivitySampler;

fn intern_atom(conn: &Connection, name: &'static [u8]) -> Result<Atom> {
    let reply = conn.wait_for_reply(conn.send_request(&InternAtom {
        only_if_exists: false,
        name,
    }))?;
    Ok(reply.atom())
}

fn get_active_window(
    conn: &Connection,
    root: Window,
    active_window_atom: Atom,
) -> Result<Option<Window>> {
    let result = conn.wait_for_reply(conn.send_request(&GetProperty {
        delete: false,
        window: root,
        property: active_window_atom,
        r#type: ATOM_ANY,
        long_offset: 0,
        long_length: 1,
    }))?;
    Ok(result.value::<Window>().first().copied())
}

fn get_name(conn: &Connection, window: Window, wm_name_atom: Atom) -> Result<String> {
    let wm_name = conn.wait_for_reply(conn.send_request(&GetProperty {
        delete: false,
        window,
        property: wm_name_atom,
        r#type: ATOM_ANY,
        long_offset: 0,
        long_length: 1024,
    }))?;
    Ok(String::from_utf8_lossy(wm_name.value::<u8>()).into_owned())
}

pub struct X11Sampler {
    connection: Connection,
    preferred_screen: usize,
    active_window_atom: Atom,
    window_name_atom: Atom,
}

impl X11Sampler {
    pub fn new() -> Result<Self> {
        let (connection, preferred_screen) = Connection::connect(None)?;
        let active_window_atom = intern_atom(&connection, b"_NET_ACTIVE_WINDOW")?;
        let window_name_atom = intern_atom(&connection, b"_NET_WM_NAME")?;
        Ok(Self {
            connection,
            preferred_screen: preferred_screen.max(0) as usize,
            active_window_atom,
            window_name_atom,
        })
    }

    // Currently only one X11 screen is supported.
    fn root(&self) -> Result<Window> {
        self.connection
            .get_setup()
            .roots()
            .nth(self.preferred_screen)
            .map(|screen| screen.root())
            .ok_or_else(|| anyhow!("X11 screen {} is not available", self.preferred_screen))
    }
}

impl ActivitySampler for X11Sampler {
    #[instrument(skip(self))]
    fn foreground_window_title(&mut self) -> Result<String> {
        let root = self.root()?;
        match get_active_window(&self.connection, root, self.active_window_atom)? {
            Some(window) if !window.is_none() => {
                get_name(&self.connection, window, self.window_name_atom)
            }
            _ => Ok(String::new()),
        }
    }

    #[instrument(skip(self))]
    fn idle_time(&mut self) -> Result<u32> {
        let root = self.root()?;
        let idle = self.connection.send_request(&QueryInfo {
            drawable: Drawable::Window(root),
        });
        let reply: QueryInfoReply = self.connection.wait_for_reply(idle)?;
        Ok(reply.ms_since_user_input())
    }
}
