mod election;
mod initial_election;
mod leader_observed;
mod liveness;
mod persistence;
