//! Collective communication between ranks that share no memory.
//!
//! The distributed strategy only talks to its peers through a
//! [`Communicator`]. Implementors provide point-to-point [`send`] and
//! [`receive`]; the collectives are built on top of them with rank `0`
//! acting as the hub of reductions. Messages between any ordered pair of
//! ranks must be delivered in the order they were sent.
//!
//! Every message is stamped with the collective it belongs to and the
//! caller's epoch (the generation number for periodic synchronizations). A
//! rank that receives a message stamped differently from what it is
//! waiting for fails with [`Error::CollectiveMismatch`] instead of silently
//! pairing up unrelated operations.
//!
//! [`send`]: Communicator::send
//! [`receive`]: Communicator::receive

use std::{cmp::Ordering, fmt};

use crossbeam::channel::{unbounded, Receiver, Sender};

use crate::{
  best::{BestSolution, Solution},
  error::{Error, Result},
  geometry::{Length, Point},
  tour::Tour,
};

/// Epoch used for collectives that happen once per run.
pub const SETUP_EPOCH: u64 = u64::MAX;

/// The collective a [`Message`] belongs to.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Collective {
  /// Distribution of the point list before generation 0.
  Points,
  /// Argmin reduction over local best lengths.
  AllReduce,
  /// Broadcast of the winning tour.
  Broadcast,
  /// Final gather of local bests at the coordinator.
  Gather,
}

impl fmt::Display for Collective {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      Collective::Points => "points",
      Collective::AllReduce => "all-reduce",
      Collective::Broadcast => "broadcast",
      Collective::Gather => "gather",
    };
    f.write_str(name)
  }
}

/// Content of a [`Message`].
#[derive(Clone, Debug, PartialEq)]
pub enum Payload {
  /// Number of points that will follow.
  Count(usize),
  /// The point list.
  Points(Vec<Point>),
  /// One rank's contribution to a reduction.
  Length(Length),
  /// Result of a reduction.
  MinLoc(MinLoc),
  /// A broadcast tour.
  Tour(Tour),
  /// One rank's final best, `None` if it never found one.
  Best(Option<Solution>),
}

/// A stamped payload exchanged between two ranks.
#[derive(Clone, Debug, PartialEq)]
pub struct Message {
  /// Collective the sender was in.
  pub collective: Collective,
  /// Epoch the sender was in.
  pub epoch: u64,
  /// Content.
  pub payload: Payload,
}

/// Result of an argmin reduction: the smallest length and the rank that
/// holds it. Equal lengths resolve to the lowest rank.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct MinLoc {
  /// Globally smallest local best length.
  pub length: Length,
  /// Lowest rank holding it.
  pub rank: usize,
}

impl MinLoc {
  /// The smaller of two candidates, by length, then by rank.
  pub fn min(self, other: Self) -> Self {
    match self
      .length
      .total_cmp(&other.length)
      .then(self.rank.cmp(&other.rank))
    {
      Ordering::Greater => other,
      _ => self,
    }
  }
}

/// A rank's view of a group of ranks.
///
/// Every rank of the group must call the same collectives, in the same
/// order, with the same epochs and roots. A rank that stops participating
/// stalls its peers until its endpoint is dropped, at which point they fail
/// with [`Error::Disconnected`].
pub trait Communicator {
  /// This rank's index in `0..size()`.
  fn rank(&self) -> usize;

  /// Number of ranks in the group.
  fn size(&self) -> usize;

  /// Sends `message` to rank `peer`.
  fn send(&self, peer: usize, message: Message) -> Result<()>;

  /// Blocks until the next message from rank `peer` arrives.
  fn receive(&self, peer: usize) -> Result<Message>;

  /// Distributes the point list held by `root` to every rank: first the
  /// point count, then the points. `points` is only read on `root`.
  fn broadcast_points(
    &self,
    root: usize,
    points: Option<Vec<Point>>,
  ) -> Result<Vec<Point>> {
    if self.rank() == root {
      let points = points.ok_or_else(|| {
        Error::invalid_input("root rank has no points to distribute")
      })?;
      for peer in peers(self) {
        let count = Payload::Count(points.len());
        self.send(peer, stamp(Collective::Points, SETUP_EPOCH, count))?;
        let data = Payload::Points(points.clone());
        self.send(peer, stamp(Collective::Points, SETUP_EPOCH, data))?;
      }
      return Ok(points);
    }

    let count = match expect(self, root, Collective::Points, SETUP_EPOCH)? {
      Payload::Count(count) => count,
      other => return Err(unexpected(self, root, Collective::Points, other)),
    };
    match expect(self, root, Collective::Points, SETUP_EPOCH)? {
      Payload::Points(points) if points.len() == count => Ok(points),
      Payload::Points(points) => Err(Error::invalid_input(format!(
        "announced {count} points but received {}",
        points.len()
      ))),
      other => Err(unexpected(self, root, Collective::Points, other)),
    }
  }

  /// Finds the smallest `length` over all ranks and the lowest rank holding
  /// it. Every rank receives the same result.
  fn all_reduce_min_loc(&self, epoch: u64, length: Length) -> Result<MinLoc> {
    const HUB: usize = 0;
    let own = MinLoc {
      length,
      rank: self.rank(),
    };

    if self.rank() != HUB {
      let contribution = Payload::Length(length);
      self.send(HUB, stamp(Collective::AllReduce, epoch, contribution))?;
      return match expect(self, HUB, Collective::AllReduce, epoch)? {
        Payload::MinLoc(result) => Ok(result),
        other => Err(unexpected(self, HUB, Collective::AllReduce, other)),
      };
    }

    let mut result = own;
    for peer in peers(self) {
      match expect(self, peer, Collective::AllReduce, epoch)? {
        Payload::Length(length) => {
          result = result.min(MinLoc { length, rank: peer })
        }
        other => {
          return Err(unexpected(self, peer, Collective::AllReduce, other))
        }
      }
    }
    for peer in peers(self) {
      let reduced = Payload::MinLoc(result);
      self.send(peer, stamp(Collective::AllReduce, epoch, reduced))?;
    }
    Ok(result)
  }

  /// Sends `root`'s tour to every rank. `tour` is only read on `root`.
  fn broadcast_tour(
    &self,
    epoch: u64,
    root: usize,
    tour: Option<Tour>,
  ) -> Result<Tour> {
    if self.rank() == root {
      let tour = tour.ok_or_else(|| {
        Error::invalid_input("broadcast root has no tour to send")
      })?;
      for peer in peers(self) {
        let payload = Payload::Tour(tour.clone());
        self.send(peer, stamp(Collective::Broadcast, epoch, payload))?;
      }
      return Ok(tour);
    }

    match expect(self, root, Collective::Broadcast, epoch)? {
      Payload::Tour(tour) => Ok(tour),
      other => Err(unexpected(self, root, Collective::Broadcast, other)),
    }
  }

  /// Collects every rank's `best` at `root`, in rank order. Returns `None` on
  /// every other rank.
  fn gather(
    &self,
    epoch: u64,
    root: usize,
    best: BestSolution,
  ) -> Result<Option<Vec<BestSolution>>> {
    if self.rank() != root {
      let payload = Payload::Best(best.into_solution());
      self.send(root, stamp(Collective::Gather, epoch, payload))?;
      return Ok(None);
    }

    let mut own = Some(best);
    let mut gathered = Vec::with_capacity(self.size());
    for peer in 0..self.size() {
      if peer == root {
        gathered.extend(own.take());
        continue;
      }
      match expect(self, peer, Collective::Gather, epoch)? {
        Payload::Best(solution) => {
          gathered.push(solution.map(BestSolution::from).unwrap_or_default())
        }
        other => return Err(unexpected(self, peer, Collective::Gather, other)),
      }
    }
    Ok(Some(gathered))
  }
}

fn peers<C: Communicator + ?Sized>(comm: &C) -> impl Iterator<Item = usize> {
  let rank = comm.rank();
  (0..comm.size()).filter(move |&peer| peer != rank)
}

fn stamp(collective: Collective, epoch: u64, payload: Payload) -> Message {
  Message {
    collective,
    epoch,
    payload,
  }
}

fn describe(collective: Collective, epoch: u64) -> String {
  if epoch == SETUP_EPOCH {
    format!("{collective} (setup)")
  } else {
    format!("{collective} at epoch {epoch}")
  }
}

/// Receives from `peer` and checks the message belongs to `collective` at
/// `epoch`.
fn expect<C: Communicator + ?Sized>(
  comm: &C,
  peer: usize,
  collective: Collective,
  epoch: u64,
) -> Result<Payload> {
  let message = comm.receive(peer)?;
  if message.collective == collective && message.epoch == epoch {
    Ok(message.payload)
  } else {
    Err(Error::CollectiveMismatch {
      rank: comm.rank(),
      peer,
      expected: describe(collective, epoch),
      found: describe(message.collective, message.epoch),
    })
  }
}

fn unexpected<C: Communicator + ?Sized>(
  comm: &C,
  peer: usize,
  collective: Collective,
  payload: Payload,
) -> Error {
  Error::CollectiveMismatch {
    rank: comm.rank(),
    peer,
    expected: format!("{collective} payload"),
    found: format!("{payload:?}"),
  }
}

/// Builds the endpoints of an in-process group of ranks.
///
/// Each pair of ranks is connected by a dedicated FIFO channel in each
/// direction, so ranks running on separate threads share nothing but those
/// channels.
#[derive(Debug)]
pub struct LocalCluster;

impl LocalCluster {
  /// Creates `size` connected endpoints, one per rank, in rank order.
  pub fn new(size: usize) -> Vec<LocalCommunicator> {
    let mut senders: Vec<Vec<Option<Sender<Message>>>> =
      (0..size).map(|_| (0..size).map(|_| None).collect()).collect();
    let mut receivers: Vec<Vec<Option<Receiver<Message>>>> =
      (0..size).map(|_| (0..size).map(|_| None).collect()).collect();

    for from in 0..size {
      for to in (0..size).filter(|&to| to != from) {
        let (s, r) = unbounded();
        senders[from][to] = Some(s);
        receivers[to][from] = Some(r);
      }
    }

    senders
      .into_iter()
      .zip(receivers)
      .enumerate()
      .map(|(rank, (senders, receivers))| LocalCommunicator {
        rank,
        senders,
        receivers,
      })
      .collect()
  }
}

/// One rank's endpoint of a [`LocalCluster`].
#[derive(Debug)]
pub struct LocalCommunicator {
  rank: usize,
  senders: Vec<Option<Sender<Message>>>,
  receivers: Vec<Option<Receiver<Message>>>,
}

impl Communicator for LocalCommunicator {
  fn rank(&self) -> usize {
    self.rank
  }

  fn size(&self) -> usize {
    self.senders.len()
  }

  fn send(&self, peer: usize, message: Message) -> Result<()> {
    let disconnected = Error::Disconnected {
      rank: self.rank,
      peer,
    };
    match self.senders.get(peer).and_then(Option::as_ref) {
      Some(sender) => sender.send(message).map_err(|_| disconnected),
      None => Err(disconnected),
    }
  }

  fn receive(&self, peer: usize) -> Result<Message> {
    let disconnected = Error::Disconnected {
      rank: self.rank,
      peer,
    };
    match self.receivers.get(peer).and_then(Option::as_ref) {
      Some(receiver) => receiver.recv().map_err(|_| disconnected),
      None => Err(disconnected),
    }
  }
}
