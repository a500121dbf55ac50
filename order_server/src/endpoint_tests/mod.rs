mod cart;
mod helpers;
mod mocks;
mod orders;
mod products;
mod webhook;
