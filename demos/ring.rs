//! Tour of the group operations on a four-participant launch: broadcast,
//! scatter, gather, reduce, and a point-to-point ring exchange.
//!
//! Run with: cargo run --example ring

use cohort::{Comm, ReduceOp, ThreadComm};

fn main() {
    env_logger::init();

    let seq: Vec<i64> = (0..20).collect();
    ThreadComm::launch(4, |comm| {
        let rank = comm.rank();

        // one-to-all: rank 0 announces a parameter
        let parameter = if rank == 0 { Some(42_i64) } else { None };
        let parameter = comm.broadcast(parameter, 0).unwrap();
        println!("rank {rank}: received broadcast {parameter}");

        // partition-to-all, then the inverse
        let root_input = if rank == 0 { Some(&seq[..]) } else { None };
        let part = comm.scatter(root_input, 0).unwrap();
        println!("rank {rank}: holds partition {part:?}");
        if let Some(rejoined) = comm.gather(&part, 0).unwrap() {
            assert_eq!(rejoined, seq);
            println!("rank {rank}: gather rejoined the full sequence");
        }

        // all-to-one combine
        if let Some(total) = comm.reduce(&part, ReduceOp::Sum, 0).unwrap() {
            println!("rank {rank}: global sum is {total}");
        }

        // point-to-point ring: pass a greeting to the successor
        let next = (rank + 1) % comm.size();
        let prev = (rank + comm.size() - 1) % comm.size();
        comm.send(format!("hello from rank {rank}"), next, 0).unwrap();
        let greeting: String = comm.recv(prev, 0).unwrap();
        println!("rank {rank}: {greeting}");
    })
    .unwrap();
}
