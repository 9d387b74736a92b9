// Copyright (C) 2025 Ryan Daum <ryan.daum@gmail.com> This program is free
// software: you can redistribute it and/or modify it under the terms of the GNU
// General Public License as published by the Free Software Foundation, version
// 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

use std::collections::HashSet;
use std::sync::RwLock;

use thiserror::Error;
use warren_var::Obj;

/// The connection side of the world, as seen from running scripts.
pub trait Session: Send + Sync {
    /// Deliver a line of text to the given player's connection.
    fn send_text(&self, player: &Obj, msg: &str) -> Result<(), SessionError>;

    /// Return the list of currently-connected players.
    fn connected_players(&self) -> Result<Vec<Obj>, SessionError>;

    fn is_connected(&self, player: &Obj) -> Result<bool, SessionError> {
        Ok(self.connected_players()?.contains(player))
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum SessionError {
    #[error("No connection for player {0}")]
    NoConnectionForPlayer(Obj),
    #[error("Could not deliver session message")]
    DeliveryError,
}

/// A simple no-op implementation of the Session trait, for use in unit tests.
/// No output, and pretends no players are connected.
#[derive(Default)]
pub struct NoopClientSession {}

impl NoopClientSession {
    pub fn new() -> Self {
        Self {}
    }
}

impl Session for NoopClientSession {
    fn send_text(&self, _player: &Obj, _msg: &str) -> Result<(), SessionError> {
        Ok(())
    }

    fn connected_players(&self) -> Result<Vec<Obj>, SessionError> {
        Ok(vec![])
    }
}

#[derive(Default)]
struct Inner {
    connected: HashSet<Obj>,
    output: Vec<(Obj, String)>,
}

/// A session which keeps track of which players are attached and buffers everything sent to
/// them until it is taken. Used by the console and by tests.
#[derive(Default)]
pub struct BufferedSession {
    inner: RwLock<Inner>,
}

impl BufferedSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect(&self, player: &Obj) {
        self.inner.write().unwrap().connected.insert(player.clone());
    }

    pub fn disconnect(&self, player: &Obj) {
        self.inner.write().unwrap().connected.remove(player);
    }

    /// Drain whatever has been sent to `player` so far.
    pub fn take_output(&self, player: &Obj) -> Vec<String> {
        let mut inner = self.inner.write().unwrap();
        let (mine, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut inner.output)
            .into_iter()
            .partition(|(to, _)| to == player);
        inner.output = rest;
        mine.into_iter().map(|(_, msg)| msg).collect()
    }
}

impl Session for BufferedSession {
    fn send_text(&self, player: &Obj, msg: &str) -> Result<(), SessionError> {
        let mut inner = self.inner.write().unwrap();
        if !inner.connected.contains(player) {
            return Err(SessionError::NoConnectionForPlayer(player.clone()));
        }
        inner.output.push((player.clone(), msg.to_string()));
        Ok(())
    }

    fn connected_players(&self) -> Result<Vec<Obj>, SessionError> {
        let mut players: Vec<_> = self.inner.read().unwrap().connected.iter().cloned().collect();
        players.sort();
        Ok(players)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_buffered_session_delivery() {
        let session = BufferedSession::new();
        let test = Obj::mk_id("test");
        let other = Obj::mk_id("other");
        assert_eq!(
            session.send_text(&test, "hi"),
            Err(SessionError::NoConnectionForPlayer(test.clone()))
        );
        session.connect(&test);
        session.connect(&other);
        session.send_text(&test, "one").unwrap();
        session.send_text(&other, "elsewhere").unwrap();
        session.send_text(&test, "two").unwrap();
        assert_eq!(session.take_output(&test), vec!["one", "two"]);
        assert!(session.take_output(&test).is_empty());
        assert_eq!(session.take_output(&other), vec!["elsewhere"]);
        assert!(session.is_connected(&test).unwrap());
        session.disconnect(&test);
        assert_eq!(session.connected_players().unwrap(), vec![other]);
    }
}
