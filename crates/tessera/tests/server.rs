//! Integration tests for the Tessera server over real loopback TCP.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tessera::prelude::*;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

// =========================================================================
// Harness
// =========================================================================

const TIMEOUT: Duration = Duration::from_secs(2);

async fn start(builder: TesseraServerBuilder) -> (SocketAddr, Arc<World>) {
    let server = builder.bind("127.0.0.1:0").build().await.unwrap();
    let addr = server.local_addr().unwrap();
    let world = server.world();
    tokio::spawn(server.run());
    (addr, world)
}

struct Client {
    stream: TcpStream,
    reader: FrameReader,
    pending: Vec<ServerMessage>,
}

impl Client {
    async fn connect(addr: SocketAddr) -> Self {
        Self {
            stream: TcpStream::connect(addr).await.unwrap(),
            reader: FrameReader::new(),
            pending: Vec::new(),
        }
    }

    async fn send(&mut self, msg: ClientMessage) {
        let frame = msg.to_frame().unwrap();
        self.stream.write_all(&frame).await.unwrap();
    }

    /// Waits for the next server message.
    async fn recv(&mut self) -> ServerMessage {
        loop {
            if !self.pending.is_empty() {
                return self.pending.remove(0);
            }
            let mut buf = [0u8; 1024];
            let n = tokio::time::timeout(TIMEOUT, self.stream.read(&mut buf))
                .await
                .expect("timed out waiting for server")
                .unwrap();
            assert!(n > 0, "server closed the connection");
            for body in self.reader.push(&buf[..n]) {
                self.pending.push(ServerMessage::decode(&body).unwrap());
            }
        }
    }

    async fn login(&mut self, name: &str) -> ServerMessage {
        self.send(ClientMessage::Login {
            name: name.to_string(),
        })
        .await;
        self.recv().await
    }
}

async fn wait_for_players(world: &World, count: usize) {
    for _ in 0..200 {
        if world.player_count().await == count {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("player count never reached {count}");
}

fn stats(hp: u16, max_hp: u16, mana: u16, max_mana: u16) -> ServerMessage {
    ServerMessage::UpdateStats {
        hp,
        max_hp,
        mana,
        max_mana,
    }
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_login_over_tcp_replies_stats() {
    let (addr, world) = start(TesseraServer::builder()).await;
    let mut client = Client::connect(addr).await;

    let reply = client.login("Arthur").await;

    assert_eq!(reply, stats(200, 200, 50, 50));
    assert_eq!(world.player_names().await, vec!["Arthur"]);
}

#[tokio::test]
async fn test_frame_split_across_writes_is_reassembled() {
    let (addr, _world) = start(TesseraServer::builder()).await;
    let mut client = Client::connect(addr).await;
    let frame = ClientMessage::Login {
        name: "Arthur".into(),
    }
    .to_frame()
    .unwrap();

    client.stream.write_all(&frame[..1]).await.unwrap();
    client.stream.flush().await.unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;
    client.stream.write_all(&frame[1..]).await.unwrap();

    assert_eq!(client.recv().await, stats(200, 200, 50, 50));
}

#[tokio::test]
async fn test_chat_reaches_every_connected_client() {
    let (addr, world) = start(TesseraServer::builder()).await;
    let mut arthur = Client::connect(addr).await;
    let mut bob = Client::connect(addr).await;
    arthur.login("Arthur").await;
    bob.login("Bob").await;
    wait_for_players(&world, 2).await;

    arthur
        .send(ClientMessage::Say {
            text: "hello".into(),
        })
        .await;

    let expected = ServerMessage::Chat {
        text: "Arthur: hello".into(),
    };
    assert_eq!(arthur.recv().await, expected);
    assert_eq!(bob.recv().await, expected);
}

#[tokio::test]
async fn test_heal_over_tcp_sends_notice_stats_and_chant() {
    let (addr, _world) = start(TesseraServer::builder()).await;
    let mut arthur = Client::connect(addr).await;
    arthur.login("Arthur").await;
    arthur.send(ClientMessage::Damage { amount: 20 }).await;
    assert_eq!(arthur.recv().await, stats(180, 200, 50, 50));

    arthur
        .send(ClientMessage::Say {
            text: "exura".into(),
        })
        .await;

    assert_eq!(
        arthur.recv().await,
        ServerMessage::system("You healed 20 hitpoints.")
    );
    assert_eq!(arthur.recv().await, stats(200, 200, 30, 50));
    assert_eq!(
        arthur.recv().await,
        ServerMessage::Chat {
            text: "Arthur: exura".into()
        }
    );
}

#[tokio::test]
async fn test_unknown_opcode_does_not_close_connection() {
    let (addr, _world) = start(TesseraServer::builder()).await;
    let mut client = Client::connect(addr).await;

    client.stream.write_all(&[1, 0, 0x99]).await.unwrap();

    assert_eq!(client.login("Arthur").await, stats(200, 200, 50, 50));
}

#[tokio::test]
async fn test_disconnect_removes_player_from_world() {
    let (addr, world) = start(TesseraServer::builder()).await;
    let mut client = Client::connect(addr).await;
    client.login("Arthur").await;
    wait_for_players(&world, 1).await;

    drop(client);

    wait_for_players(&world, 0).await;
}

#[tokio::test]
async fn test_idle_connection_is_closed_and_cleaned_up() {
    let builder = TesseraServer::builder().idle_timeout(Some(Duration::from_millis(100)));
    let (addr, world) = start(builder).await;
    let mut client = Client::connect(addr).await;
    client.login("Arthur").await;

    let mut buf = [0u8; 16];
    let n = tokio::time::timeout(TIMEOUT, client.stream.read(&mut buf))
        .await
        .expect("server should close the idle connection")
        .unwrap();

    assert_eq!(n, 0);
    wait_for_players(&world, 0).await;
}

#[tokio::test]
async fn test_map_path_loads_custom_world() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tiny.json");
    std::fs::write(
        &path,
        r#"{"width":3,"height":1,"tiles":[2,1,2],"spawn":{"x":1,"y":0}}"#,
    )
    .unwrap();

    let (_addr, world) = start(TesseraServer::builder().map_path(&path)).await;

    assert_eq!((world.width(), world.height()), (3, 1));
}

#[tokio::test]
async fn test_map_path_invalid_file_falls_back_to_builtin() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{ nope").unwrap();

    let (_addr, world) = start(TesseraServer::builder().map_path(&path)).await;

    assert_eq!(world.width(), World::default_grid().width());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_half_close_still_delivers_every_queued_reply() {
    let (addr, world) = start(TesseraServer::builder()).await;

    let mut clients = Vec::new();
    for i in 0..20 {
        clients.push(tokio::spawn(async move {
            let mut stream = TcpStream::connect(addr).await.unwrap();
            let mut burst = ClientMessage::Login {
                name: format!("Caster{i}"),
            }
            .to_frame()
            .unwrap();
            for _ in 0..20 {
                burst.extend(
                    ClientMessage::Say {
                        text: "exura".into(),
                    }
                    .to_frame()
                    .unwrap(),
                );
            }
            stream.write_all(&burst).await.unwrap();
            stream.shutdown().await.unwrap();

            let mut received = Vec::new();
            tokio::time::timeout(TIMEOUT, stream.read_to_end(&mut received))
                .await
                .expect("server should close after draining")
                .unwrap();
            let messages: Vec<ServerMessage> = FrameReader::new()
                .push(&received)
                .iter()
                .map(|body| ServerMessage::decode(body).unwrap())
                .collect();
            (format!("Caster{i}"), messages)
        }));
    }

    for client in clients {
        let (name, replies) = client.await.unwrap();
        let chant = ServerMessage::Chat {
            text: format!("{name}: exura"),
        };
        let not_enough = ServerMessage::system("Not enough mana.");
        let full = ServerMessage::system("You are already at full health.");
        let own_stats: Vec<_> = replies
            .iter()
            .filter(|m| matches!(m, ServerMessage::UpdateStats { .. }))
            .cloned()
            .collect();

        // Other casters' chants interleave freely; count only this
        // connection's own replies. 50 mana: two casts succeed, eighteen
        // are refused.
        assert_eq!(
            own_stats,
            vec![
                stats(200, 200, 50, 50),
                stats(200, 200, 30, 50),
                stats(200, 200, 10, 50),
            ],
            "{name}"
        );
        assert_eq!(replies.iter().filter(|m| **m == full).count(), 2, "{name}");
        assert_eq!(replies.iter().filter(|m| **m == chant).count(), 2, "{name}");
        assert_eq!(
            replies.iter().filter(|m| **m == not_enough).count(),
            18,
            "{name}"
        );
    }
    wait_for_players(&world, 0).await;
}
