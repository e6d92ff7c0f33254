//! TCP transport. A background thread runs a tokio runtime that owns every
//! socket; the simulation thread only touches the shared queues below.

use std::{
    collections::{HashMap, VecDeque},
    net::SocketAddr,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex,
    },
};

use log::{debug, error, info, trace, warn};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
    sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender},
};

use thengill_shared::{frame, FrameDecoder, DEFAULT_MAX_FRAME_BYTES};

use super::{
    LinkEvent, LinkId, LinkReceiver, LinkSender, PeerSocket, RecvError, SendError, TransportError,
};

const READ_BUFFER_BYTES: usize = 16 * 1024;

type Inbound = Arc<Mutex<VecDeque<LinkEvent>>>;
type Writers = Arc<Mutex<HashMap<LinkId, UnboundedSender<Vec<u8>>>>>;

enum Command {
    Connect(String),
    Disconnect(LinkId),
}

// Socket
pub struct TcpSocket {
    listen_address: SocketAddr,
    max_frame_bytes: usize,
}

impl TcpSocket {
    pub fn new(listen_address: SocketAddr) -> Self {
        Self {
            listen_address,
            max_frame_bytes: DEFAULT_MAX_FRAME_BYTES,
        }
    }

    /// Parses `address` (`ip:port`) and listens on it once opened.
    pub fn bind(address: &str) -> Result<Self, TransportError> {
        let listen_address = address
            .parse::<SocketAddr>()
            .map_err(|err| TransportError::InvalidAddress {
                address: address.to_string(),
                reason: err.to_string(),
            })?;
        Ok(Self::new(listen_address))
    }

    pub fn with_max_frame_bytes(mut self, max_frame_bytes: usize) -> Self {
        self.max_frame_bytes = max_frame_bytes;
        self
    }
}

impl PeerSocket for TcpSocket {
    fn open(self: Box<Self>) -> (Box<dyn LinkSender>, Box<dyn LinkReceiver>) {
        let inbound: Inbound = Arc::new(Mutex::new(VecDeque::new()));
        let writers: Writers = Arc::new(Mutex::new(HashMap::new()));
        let (command_sender, command_receiver) = unbounded_channel();

        spawn_io_thread(
            self.listen_address,
            self.max_frame_bytes,
            command_receiver,
            inbound.clone(),
            writers.clone(),
        );

        let sender = TcpLinkSender {
            address: self.listen_address.to_string(),
            writers,
            commands: command_sender,
        };
        let receiver = TcpLinkReceiver { inbound };
        (Box::new(sender), Box::new(receiver))
    }
}

fn spawn_io_thread(
    listen_address: SocketAddr,
    max_frame_bytes: usize,
    mut commands: UnboundedReceiver<Command>,
    inbound: Inbound,
    writers: Writers,
) {
    std::thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                error!("Failed to create tokio runtime: {}", err);
                return;
            }
        };

        runtime.block_on(async move {
            let links = Arc::new(AtomicU64::new(0));

            match TcpListener::bind(listen_address).await {
                Ok(listener) => {
                    info!("Listening for peers on {}", listen_address);
                    tokio::spawn(accept_loop(
                        listener,
                        links.clone(),
                        max_frame_bytes,
                        inbound.clone(),
                        writers.clone(),
                    ));
                }
                Err(err) => {
                    error!("Failed to listen on {}: {}", listen_address, err);
                }
            }

            while let Some(command) = commands.recv().await {
                match command {
                    Command::Connect(address) => {
                        let links = links.clone();
                        let inbound = inbound.clone();
                        let writers = writers.clone();
                        tokio::spawn(async move {
                            match TcpStream::connect(address.as_str()).await {
                                Ok(stream) => {
                                    debug!("Connected to {}", address);
                                    let link = LinkId(links.fetch_add(1, Ordering::Relaxed));
                                    run_link(link, stream, max_frame_bytes, inbound, writers);
                                }
                                Err(err) => {
                                    warn!("Failed to connect to {}: {}", address, err);
                                    push(&inbound, LinkEvent::ConnectFailed(address));
                                }
                            }
                        });
                    }
                    Command::Disconnect(link) => {
                        // dropping the writer ends the write task, which shuts the socket down
                        lock(&writers).remove(&link);
                    }
                }
            }
            debug!("Peer socket closed, stopping I/O thread");
        });
    });
}

async fn accept_loop(
    listener: TcpListener,
    links: Arc<AtomicU64>,
    max_frame_bytes: usize,
    inbound: Inbound,
    writers: Writers,
) {
    loop {
        match listener.accept().await {
            Ok((stream, remote)) => {
                debug!("Accepted peer connection from {}", remote);
                let link = LinkId(links.fetch_add(1, Ordering::Relaxed));
                run_link(link, stream, max_frame_bytes, inbound.clone(), writers.clone());
            }
            Err(err) => {
                warn!("Accept error: {}", err);
            }
        }
    }
}

fn run_link(
    link: LinkId,
    stream: TcpStream,
    max_frame_bytes: usize,
    inbound: Inbound,
    writers: Writers,
) {
    if let Err(err) = stream.set_nodelay(true) {
        trace!("{:?}: could not disable Nagle: {}", link, err);
    }
    let (mut read_half, mut write_half) = stream.into_split();
    let (frame_sender, mut frame_receiver) = unbounded_channel::<Vec<u8>>();

    lock(&writers).insert(link, frame_sender);
    push(&inbound, LinkEvent::Connected(link));

    tokio::spawn(async move {
        while let Some(bytes) = frame_receiver.recv().await {
            if let Err(err) = write_half.write_all(&bytes).await {
                warn!("{:?}: write failed: {}", link, err);
                break;
            }
        }
        let _ = write_half.shutdown().await;
    });

    tokio::spawn(async move {
        let mut decoder = FrameDecoder::new(max_frame_bytes);
        let mut buffer = vec![0u8; READ_BUFFER_BYTES];
        'read: loop {
            let read = match read_half.read(&mut buffer).await {
                Ok(0) => break,
                Ok(read) => read,
                Err(err) => {
                    warn!("{:?}: read failed: {}", link, err);
                    break;
                }
            };
            decoder.push(&buffer[..read]);
            loop {
                match decoder.next_frame() {
                    Ok(Some(payload)) => push(&inbound, LinkEvent::Received(link, payload)),
                    Ok(None) => break,
                    Err(err) => {
                        warn!("{:?}: {}", link, err);
                        break 'read;
                    }
                }
            }
        }
        lock(&writers).remove(&link);
        push(&inbound, LinkEvent::Disconnected(link));
    });
}

fn push(inbound: &Inbound, event: LinkEvent) {
    let mut queue = match inbound.lock() {
        Ok(queue) => queue,
        Err(poisoned) => poisoned.into_inner(),
    };
    queue.push_back(event);
}

fn lock(writers: &Writers) -> std::sync::MutexGuard<'_, HashMap<LinkId, UnboundedSender<Vec<u8>>>> {
    match writers.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

// Link Sender
struct TcpLinkSender {
    address: String,
    writers: Writers,
    commands: UnboundedSender<Command>,
}

impl LinkSender for TcpLinkSender {
    fn send(&self, link: &LinkId, payload: &[u8]) -> Result<(), SendError> {
        let framed = frame(payload).map_err(|_| SendError)?;
        let writers = lock(&self.writers);
        let Some(writer) = writers.get(link) else {
            return Err(SendError);
        };
        writer.send(framed).map_err(|_| SendError)
    }

    fn connect(&self, address: &str) -> Result<(), SendError> {
        self.commands
            .send(Command::Connect(address.to_string()))
            .map_err(|_| SendError)
    }

    fn disconnect(&self, link: &LinkId) {
        if self.commands.send(Command::Disconnect(*link)).is_err() {
            warn!("I/O thread is gone, cannot disconnect {:?}", link);
        }
    }

    fn local_address(&self) -> String {
        self.address.clone()
    }
}

// Link Receiver
struct TcpLinkReceiver {
    inbound: Inbound,
}

impl LinkReceiver for TcpLinkReceiver {
    fn receive(&mut self) -> Result<Option<LinkEvent>, RecvError> {
        let mut queue = self.inbound.lock().map_err(|_| RecvError)?;
        Ok(queue.pop_front())
    }
}
