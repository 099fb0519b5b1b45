#[cfg(test)]
mod test;
#[cfg(test)]
mod util;
